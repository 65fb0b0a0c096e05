use alang_lexer::Span;

/// A complete ALang source file: the ordered top-level statements
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub items: Vec<Stmt>,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    Function(FnDecl),
    Var(VarDecl),
    Block(Block),
    If(IfStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Function(f) => f.span,
            Stmt::Var(v) => v.span,
            Stmt::Block(b) => b.span,
            Stmt::If(i) => i.span,
            Stmt::Return(r) => r.span,
            Stmt::Expr(e) => e.span,
        }
    }

    /// Node kind name, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Function(_) => "function declaration",
            Stmt::Var(_) => "variable declaration",
            Stmt::Block(_) => "block statement",
            Stmt::If(_) => "if statement",
            Stmt::Return(_) => "return statement",
            Stmt::Expr(_) => "expression statement",
        }
    }
}

/// Function declaration
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// None means the function returns nothing
    pub return_type: Option<Ident>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<Ident>,
    pub span: Span,
}

/// Variable declaration: var x: u16 = expr;
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Ident,
    pub ty: Ident,
    pub init: Expr,
    pub span: Span,
}

/// A block of statements
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Expression statement
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Expressions
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Numeric literal, kept as source text: 42
    NumericLiteral(String),
    /// Reference to a variable or function: foo
    Ident(Ident),
    /// Binary operation: a + b
    Binary(Box<Expr>, BinOp, Box<Expr>),
    /// Function call: foo(a, b)
    Call(Box<Expr>, Vec<Expr>),
    /// Assignment: x = expr
    Assign(Ident, Box<Expr>),
}

impl ExprKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExprKind::NumericLiteral(_) => "numeric literal",
            ExprKind::Ident(_) => "reference",
            ExprKind::Binary(..) => "binary expression",
            ExprKind::Call(..) => "call expression",
            ExprKind::Assign(..) => "assignment",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Eq,
    NotEq,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Eq => write!(f, "=="),
            BinOp::NotEq => write!(f, "!="),
        }
    }
}

/// Identifier with span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

// === Pretty Printing ===

impl SourceFile {
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            out.push_str(&item.pretty_print(0));
        }
        out
    }
}

impl Stmt {
    pub fn pretty_print(&self, indent: usize) -> String {
        let ind = "  ".repeat(indent);
        match self {
            Stmt::Function(f) => {
                let params = f.params.iter()
                    .map(|p| match &p.ty {
                        Some(ty) => format!("{}: {}", p.name.name, ty.name),
                        None => p.name.name.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let ret = f.return_type.as_ref()
                    .map(|t| format!(" -> {}", t.name))
                    .unwrap_or_default();
                let mut out = format!("{}Func '{}'({}){}\n", ind, f.name.name, params, ret);
                out.push_str(&f.body.pretty_print(indent + 1));
                out
            }
            Stmt::Var(v) => {
                let mut out = format!("{}Var {}: {} =\n", ind, v.name.name, v.ty.name);
                out.push_str(&v.init.pretty_print_indented(indent + 1));
                out
            }
            Stmt::Block(b) => {
                let mut out = format!("{}Block\n", ind);
                for stmt in &b.stmts {
                    out.push_str(&stmt.pretty_print(indent + 1));
                }
                out
            }
            Stmt::If(i) => {
                let mut out = format!("{}If\n", ind);
                out.push_str(&format!("{}condition:\n", "  ".repeat(indent + 1)));
                out.push_str(&i.cond.pretty_print_indented(indent + 2));
                out.push_str(&format!("{}then:\n", "  ".repeat(indent + 1)));
                out.push_str(&i.then_branch.pretty_print(indent + 2));
                if let Some(else_branch) = &i.else_branch {
                    out.push_str(&format!("{}else:\n", "  ".repeat(indent + 1)));
                    out.push_str(&else_branch.pretty_print(indent + 2));
                }
                out
            }
            Stmt::Return(r) => match &r.value {
                Some(value) => {
                    let mut out = format!("{}Return\n", ind);
                    out.push_str(&value.pretty_print_indented(indent + 1));
                    out
                }
                None => format!("{}Return\n", ind),
            },
            Stmt::Expr(e) => {
                let mut out = format!("{}ExprStmt\n", ind);
                out.push_str(&e.expr.pretty_print_indented(indent + 1));
                out
            }
        }
    }
}

impl Expr {
    /// Pretty print with indentation for full AST display
    pub fn pretty_print_indented(&self, indent: usize) -> String {
        let ind = "  ".repeat(indent);
        match &self.kind {
            ExprKind::NumericLiteral(text) => format!("{}Number({})\n", ind, text),
            ExprKind::Ident(id) => format!("{}Ident({})\n", ind, id.name),
            ExprKind::Binary(l, op, r) => {
                let mut out = format!("{}Binary({})\n", ind, op);
                out.push_str(&l.pretty_print_indented(indent + 1));
                out.push_str(&r.pretty_print_indented(indent + 1));
                out
            }
            ExprKind::Call(callee, args) => {
                let mut out = format!("{}Call\n", ind);
                out.push_str(&format!("{}callee:\n", "  ".repeat(indent + 1)));
                out.push_str(&callee.pretty_print_indented(indent + 2));
                if !args.is_empty() {
                    out.push_str(&format!("{}args:\n", "  ".repeat(indent + 1)));
                    for arg in args {
                        out.push_str(&arg.pretty_print_indented(indent + 2));
                    }
                }
                out
            }
            ExprKind::Assign(target, value) => {
                let mut out = format!("{}Assign({})\n", ind, target.name);
                out.push_str(&value.pretty_print_indented(indent + 1));
                out
            }
        }
    }

    /// Compact pretty print (for inline display)
    pub fn pretty_print(&self) -> String {
        match &self.kind {
            ExprKind::NumericLiteral(text) => text.clone(),
            ExprKind::Ident(id) => id.name.clone(),
            ExprKind::Binary(l, op, r) => format!("({} {} {})", l.pretty_print(), op, r.pretty_print()),
            ExprKind::Call(callee, args) => {
                let args_str = args.iter().map(|a| a.pretty_print()).collect::<Vec<_>>().join(", ");
                format!("{}({})", callee.pretty_print(), args_str)
            }
            ExprKind::Assign(target, value) => format!("({} = {})", target.name, value.pretty_print()),
        }
    }
}
