//! Session failures

use std::path::PathBuf;

use jac_ast::PrintError;
use jac_diagnostics::Diagnostic;
use thiserror::Error;

/// Why a session produced no result. Syntax and semantic problems are not
/// failures; they are diagnostics.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", .path.display())]
    Encoding { path: PathBuf },

    #[error("formatting blocked by {} error(s)", .diagnostics.iter().filter(|d| d.is_error()).count())]
    FormatBlocked { diagnostics: Vec<Diagnostic> },

    #[error("cannot print the formatted module: {0}")]
    Print(#[from] PrintError),

    #[error("session for {} panicked: {message}", .path.display())]
    Panicked { path: PathBuf, message: String },
}

impl SessionError {
    /// Diagnostics carried by a blocked format, empty otherwise
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            SessionError::FormatBlocked { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}
