//! ALang command line driver
//!
//! Reads a source file and prints the output of one pipeline stage: tokens,
//! the AST, or IR disassembly.

use alang_ast::{SourceFile, Stmt};
use alang_ir::{IrError, Program, UntypedRegister};
use alang_lexer::{Lexer, Span, Token};
use alang_parser::{ParseError, Parser as SourceParser};
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::{info, LevelFilter};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "alang")]
#[command(version)]
#[command(about = "ALang compiler front end and IR generator", long_about = None)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show lexer output (tokens)
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show parser output (AST)
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show IR disassembly after a pipeline stage
    Ir {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Last stage to run
        #[arg(long, value_enum, default_value_t = Stage::Inferred)]
        stage: Stage,

        /// Fail if any register is still untyped
        #[arg(long)]
        require_typed: bool,
    },

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// Calls still by name
    Lowered,
    /// Calls resolved to functions and intrinsics
    Resolved,
    /// Register types inferred
    Inferred,
}

/// An error ready to be rendered against the source file
struct Diagnostic {
    message: String,
    span: Option<Span>,
}

impl Diagnostic {
    fn at(err: impl Display, span: Span) -> Self {
        Self { message: err.to_string(), span: Some(span) }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(e: ParseError) -> Self {
        Diagnostic::at(&e.message, e.span)
    }
}

impl From<IrError> for Diagnostic {
    fn from(e: IrError) -> Self {
        Diagnostic::at(&e, e.span())
    }
}

impl From<UntypedRegister> for Diagnostic {
    fn from(e: UntypedRegister) -> Self {
        Self { message: e.to_string(), span: None }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Lex { file } => with_source(&file, run_lexer),
        Commands::Parse { file } => with_source(&file, run_parser),
        Commands::Ir { file, stage, require_typed } => {
            with_source(&file, |source| run_ir(source, stage, require_typed))
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "alang", &mut io::stdout());
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

/// Read `path` and run `stage` on its contents, reporting any diagnostic
fn with_source(path: &Path, stage: impl FnOnce(&str) -> Result<(), Diagnostic>) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match stage(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(diag) => {
            report(path, &source, &diag);
            ExitCode::FAILURE
        }
    }
}

fn report(path: &Path, source: &str, diag: &Diagnostic) {
    let Some(span) = diag.span else {
        eprintln!("error: {}", diag.message);
        return;
    };

    let name = path.display().to_string();
    let name = name.as_str();
    let result = Report::build(ReportKind::Error, name, span.start)
        .with_message(&diag.message)
        .with_label(
            Label::new((name, span.start..span.end))
                .with_message(&diag.message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(source)));

    if let Err(e) = result {
        eprintln!("error: {} (could not render report: {})", diag.message, e);
    }
}

fn run_lexer(source: &str) -> Result<(), Diagnostic> {
    let tokens = Lexer::tokenize(source).map_err(|e| Diagnostic::at(&e.message, e.span))?;

    println!("{:<10} {:<12} {}", "SPAN", "KIND", "VALUE");
    println!("{}", "-".repeat(40));
    for spanned in &tokens {
        let span = format!("{}..{}", spanned.span.start, spanned.span.end);
        println!("{:<10} {:<12} {}", span, token_kind(&spanned.token), spanned.token);
    }

    let keywords = tokens.iter().filter(|t| t.token.is_keyword()).count();
    let idents = tokens.iter().filter(|t| matches!(t.token, Token::Ident(_))).count();
    println!("\nTotal tokens: {} ({} keywords, {} identifiers)", tokens.len(), keywords, idents);
    Ok(())
}

fn token_kind(token: &Token) -> &'static str {
    match token {
        t if t.is_keyword() => "keyword",
        Token::Ident(_) => "identifier",
        Token::NumericLiteral(_) => "number",
        Token::Plus | Token::Minus | Token::Eq | Token::EqEq | Token::NotEq => "operator",
        Token::LParen | Token::RParen | Token::LBrace | Token::RBrace => "delimiter",
        Token::Eof => "eof",
        _ => "punctuation",
    }
}

fn run_parser(source: &str) -> Result<(), Diagnostic> {
    let ast = SourceParser::parse(source)?;
    print!("{}", ast.pretty_print());

    let fn_count = ast.items.iter().filter(|i| matches!(i, Stmt::Function(_))).count();
    println!("\nFunctions: {}", fn_count);
    Ok(())
}

fn run_ir(source: &str, stage: Stage, require_typed: bool) -> Result<(), Diagnostic> {
    let ast: SourceFile = SourceParser::parse(source)?;
    let lowered = alang_ir::lower_program(&ast)?;

    if stage == Stage::Lowered {
        return emit(&lowered, require_typed);
    }

    let mut program = alang_ir::resolve_program(lowered)?;
    if stage == Stage::Inferred {
        let report = alang_ir::infer_types(&mut program);
        info!(
            "type inference: {} registers typed in {} sweeps",
            report.inferred, report.sweeps
        );
    }

    emit(&program, require_typed)
}

fn emit<C: Display>(program: &Program<C>, require_typed: bool) -> Result<(), Diagnostic> {
    print!("{}", program);
    if require_typed {
        program.ensure_fully_typed()?;
    }
    Ok(())
}
