//! Type annotations as written in source

use serde::{Deserialize, Serialize};
use crate::Span;

/// A type expression: `int`, `list[str]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub name: String,
    /// Single type argument, as in `list[int]`
    pub arg: Option<Box<TypeExpr>>,
    pub span: Span,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            arg: None,
            span,
        }
    }

    pub fn with_arg(name: impl Into<String>, arg: TypeExpr, span: Span) -> Self {
        Self {
            name: name.into(),
            arg: Some(Box::new(arg)),
            span,
        }
    }
}
