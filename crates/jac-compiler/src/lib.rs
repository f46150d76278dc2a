//! Jac Compiler - sessions, configuration and the public operations
//!
//! ```ignore
//! use jac_compiler::Program;
//!
//! let program = Program::default();
//! let report = program.compile("main.jac")?;
//! for error in &report.errors {
//!     eprintln!("{}", error);
//! }
//! ```

mod batch;
mod config;
mod error;
mod program;
mod session;
mod source;

pub use batch::default_jobs;
pub use config::*;
pub use error::*;
pub use program::*;
pub use session::*;
pub use source::*;

use std::path::Path;

/// Compile one file with the default configuration
pub fn compile(path: impl AsRef<Path>) -> Result<CompileReport, SessionError> {
    Program::default().compile(path)
}

/// Format one file with the default configuration
pub fn format(path: impl AsRef<Path>) -> Result<FormatOutput, SessionError> {
    Program::default().format(path)
}
