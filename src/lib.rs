//! Jac - type checker and formatter for the Jac language
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use jac_ast as ast;
pub use jac_compiler as compiler;
pub use jac_diagnostics as diagnostics;
pub use jac_parser as parser;

pub use jac_compiler::{compile, format, CompileReport, Config, FormatOutput, Program, SessionError};
