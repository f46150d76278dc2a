//! Jac AST - Core types for the abstract syntax tree
//!
//! This crate defines all AST node types, spans for source locations,
//! an in-place visitor, and the canonical printer used by the formatter.

mod span;
mod types;
mod expr;
mod stmt;
mod style;
pub mod printer;
pub mod visit;

pub use span::*;
pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use style::*;
pub use printer::{render, PrintError};

use serde::{Deserialize, Serialize};

/// A complete Jac source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub statements: Vec<Statement>,
    /// Comments after the last statement
    pub dangling_comments: Vec<String>,
    pub span: Span,
}

impl Module {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.dangling_comments.is_empty()
    }

    /// Top-level function declarations in source order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.statements.iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::Function(func) => Some(func),
            _ => None,
        })
    }

    /// Top-level imports in source order
    pub fn imports(&self) -> impl Iterator<Item = &ImportStmt> {
        self.statements.iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::Import(import) => Some(import),
            _ => None,
        })
    }
}
