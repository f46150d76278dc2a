//! Parser error types

use jac_ast::Span;
use jac_lexer::TokenKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("invalid character {text:?}")]
    InvalidCharacter { text: String, span: Span },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("invalid escape sequence {text:?} in string literal")]
    InvalidEscape { text: String, span: Span },

    #[error("{message}")]
    InvalidLiteral { message: String, span: Span },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget { span: Span },

    #[error("{what} are only allowed at module level")]
    MisplacedDeclaration { what: &'static str, span: Span },

    #[error("unmatched '}}'")]
    UnmatchedBrace { span: Span },

    #[error("nesting too deep (limit is {limit} levels)")]
    NestingTooDeep { limit: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::InvalidCharacter { span, .. } => *span,
            ParseError::UnterminatedString { span } => *span,
            ParseError::InvalidEscape { span, .. } => *span,
            ParseError::InvalidLiteral { span, .. } => *span,
            ParseError::InvalidAssignmentTarget { span } => *span,
            ParseError::MisplacedDeclaration { span, .. } => *span,
            ParseError::UnmatchedBrace { span } => *span,
            ParseError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// Fatal errors leave the tree structurally incomplete; parsing stops
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::NestingTooDeep { .. })
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.describe().to_string(),
            span,
        }
    }
}
