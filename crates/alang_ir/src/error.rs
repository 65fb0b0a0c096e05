use alang_lexer::Span;
use thiserror::Error;

/// Errors raised while generating IR. All of them abort generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("use of undeclared variable '{name}'")]
    UndeclaredVariable { name: String, span: Span },

    #[error("'{name}' is already declared in this scope")]
    DuplicateDeclaration { name: String, span: Span },

    #[error("call to unknown function '{name}'")]
    UnresolvedFunction { name: String, span: Span },

    #[error("unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    #[error("invalid integer literal '{text}'")]
    LiteralParseError { text: String, span: Span },

    #[error("{construct} is not supported here")]
    UnsupportedConstruct { construct: String, span: Span },
}

impl IrError {
    pub fn span(&self) -> Span {
        match self {
            IrError::UndeclaredVariable { span, .. }
            | IrError::DuplicateDeclaration { span, .. }
            | IrError::UnresolvedFunction { span, .. }
            | IrError::UnknownType { span, .. }
            | IrError::LiteralParseError { span, .. }
            | IrError::UnsupportedConstruct { span, .. } => *span,
        }
    }

    pub(crate) fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        IrError::UnsupportedConstruct { construct: construct.into(), span }
    }
}

pub type IrResult<T> = Result<T, IrError>;
