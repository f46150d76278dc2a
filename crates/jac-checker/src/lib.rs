//! Jac Checker - compile passes
//!
//! Performs symbol resolution, type checking and control-flow checks. Each
//! check is a [`Pass`](jac_passes::Pass) so the compile schedule runs on the
//! same pipeline as the formatter.

mod builtins;
mod flow;
mod resolve;
mod symbols;
mod typeck;
mod types;

pub use flow::FlowCheck;
pub use resolve::Resolve;
pub use symbols::*;
pub use typeck::TypeCheck;
pub use types::*;

use jac_ast::{FormatStyle, Module};
use jac_diagnostics::Diagnostics;
use jac_passes::{PassContext, Pipeline};
use thiserror::Error;

/// Problems reported as error diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("undefined name '{name}'")]
    UndefinedName { name: String },

    #[error("duplicate function '{name}'")]
    DuplicateFunction { name: String },

    #[error("duplicate parameter '{name}'")]
    DuplicateParameter { name: String },

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    #[error("type '{name}' does not take a type argument")]
    UnexpectedTypeArgument { name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("unsupported operand types for '{op}': {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("unsupported operand type for '{op}': {operand}")]
    InvalidOperand { op: &'static str, operand: String },

    #[error("'{name}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("value of type {ty} is not callable")]
    NotCallable { ty: String },

    #[error("value of type {ty} cannot be indexed")]
    NotIndexable { ty: String },

    #[error("value of type {ty} is not iterable")]
    NotIterable { ty: String },

    #[error("'{keyword}' outside loop")]
    OutsideLoop { keyword: &'static str },

    #[error("'return' outside function")]
    ReturnOutsideFunction,

    #[error("function '{name}' may reach its end without returning a value of type {ty}")]
    MissingReturn { name: String, ty: String },
}

/// Problems reported as warning diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckWarning {
    #[error("unused import '{name}'")]
    UnusedImport { name: String },

    #[error("duplicate import '{name}'")]
    DuplicateImport { name: String },

    #[error("unused variable '{name}'")]
    UnusedVariable { name: String },

    #[error("unreachable code")]
    Unreachable,
}

/// The compile schedule: `resolve`, `typeck`, `flow`
pub fn compile_pipeline() -> Pipeline {
    Pipeline::new().with(Resolve).with(TypeCheck).with(FlowCheck)
}

/// Run the compile schedule over a parsed module
pub fn check(module: Module, diagnostics: &mut Diagnostics) -> Module {
    let style = FormatStyle::default();
    let mut cx = PassContext::new(diagnostics, &style);
    compile_pipeline().run(module, &mut cx)
}
