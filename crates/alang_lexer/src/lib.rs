use logos::Logos;
use thiserror::Error;

/// Span in source code (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // === Keywords ===
    #[token("func")]
    Func,
    #[token("return")]
    Return,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("else")]
    Else,

    // === Literals ===
    /// Digits are kept as text; the IR generator parses them at full precision.
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    NumericLiteral(String),

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,

    // === Special ===
    Eof,
}

impl Token {
    pub fn is_keyword(&self) -> bool {
        matches!(self, Token::Func | Token::Return | Token::Var | Token::If | Token::Else)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Func => write!(f, "func"),
            Token::Return => write!(f, "return"),
            Token::Var => write!(f, "var"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::NumericLiteral(text) => write!(f, "{}", text),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Eq => write!(f, "="),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Semi => write!(f, ";"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}

/// Lexer wrapper that produces SpannedTokens
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, Token>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: Token::lexer(source),
            finished: false,
        }
    }

    /// Tokenize the entire source into a Vec ending with `Token::Eof`
    pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        loop {
            let spanned = lexer.next_token()?;
            let is_eof = spanned.token == Token::Eof;
            tokens.push(spanned);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        let len = self.inner.source().len();
        if self.finished {
            return Ok(SpannedToken {
                token: Token::Eof,
                span: Span::new(len, len),
            });
        }

        match self.inner.next() {
            Some(Ok(token)) => {
                let span = self.inner.span();
                Ok(SpannedToken {
                    token,
                    span: Span::new(span.start, span.end),
                })
            }
            Some(Err(())) => {
                let span = self.inner.span();
                let slice = self.inner.slice();
                let message = if slice.starts_with("/*") {
                    "unterminated block comment".to_string()
                } else {
                    format!("unexpected character '{}'", slice)
                };
                Err(LexError {
                    message,
                    span: Span::new(span.start, span.end),
                })
            }
            None => {
                self.finished = true;
                Ok(SpannedToken {
                    token: Token::Eof,
                    span: Span::new(len, len),
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::tokenize(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_function_header() {
        let tokens = Lexer::tokenize("func f(a: u16): u16 { return a; }").unwrap();

        assert!(matches!(tokens[0].token, Token::Func));
        assert!(matches!(tokens[1].token, Token::Ident(ref s) if s == "f"));
        assert!(matches!(tokens[2].token, Token::LParen));
        assert!(matches!(tokens[3].token, Token::Ident(ref s) if s == "a"));
        assert!(matches!(tokens[4].token, Token::Colon));
        assert!(matches!(tokens[5].token, Token::Ident(ref s) if s == "u16"));
        assert!(matches!(tokens[6].token, Token::RParen));
        assert!(matches!(tokens[7].token, Token::Colon));
        assert!(matches!(tokens[9].token, Token::LBrace));
        assert!(matches!(tokens[10].token, Token::Return));
        assert!(matches!(tokens[12].token, Token::Semi));
        assert!(matches!(tokens[13].token, Token::RBrace));
        assert!(matches!(tokens[14].token, Token::Eof));
        assert_eq!(tokens[1].span, Span::new(5, 6));
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(
            kinds("a == b != c = d"),
            vec![
                Token::Ident("a".into()),
                Token::EqEq,
                Token::Ident("b".into()),
                Token::NotEq,
                Token::Ident("c".into()),
                Token::Eq,
                Token::Ident("d".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        assert_eq!(kinds("if iff else elsewhere")[..4], [
            Token::If,
            Token::Ident("iff".into()),
            Token::Else,
            Token::Ident("elsewhere".into()),
        ]);
    }

    #[test]
    fn test_numeric_literal_keeps_text() {
        let tokens = kinds("123456789012345678901234567890");
        assert_eq!(tokens[0], Token::NumericLiteral("123456789012345678901234567890".into()));
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// line\nvar /* block\n * comment */ x";
        assert_eq!(kinds(source), vec![Token::Var, Token::Ident("x".into()), Token::Eof]);
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::tokenize("var x = 1 * 2;").unwrap_err();
        assert_eq!(err.message, "unexpected character '*'");
        assert_eq!(err.span, Span::new(10, 11));
    }

    #[test]
    fn test_eof_span_is_end_of_source() {
        let tokens = Lexer::tokenize("x ").unwrap();
        assert_eq!(tokens.last().map(|t| t.span), Some(Span::new(2, 2)));
    }
}
