//! The two public operations: compile and format

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jac_ast::render;
use jac_diagnostics::Diagnostic;
use serde::Serialize;
use tracing::error;

use crate::batch::{default_jobs, map_ordered};
use crate::{Config, Session, SessionError, SourceUnit};

/// Outcome of `compile`: every error (fatal included) and warning found
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    pub path: PathBuf,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl CompileReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// No errors and no warnings
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Outcome of `format`
#[derive(Debug, Clone)]
pub struct FormatOutput {
    /// Canonical text, with the input's byte order mark kept
    pub text: String,
    /// The canonical text differs from the input
    pub modified: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl FormatOutput {
    /// Write the canonical text when it differs from the input. Returns
    /// whether the file was written.
    pub fn write_if_modified(&self, path: impl AsRef<Path>) -> io::Result<bool> {
        if !self.modified {
            return Ok(false);
        }
        fs::write(path, &self.text)?;
        Ok(true)
    }
}

/// Entry point holding the immutable configuration. Each call runs its own
/// session, so one `Program` can serve many threads.
#[derive(Debug, Clone)]
pub struct Program {
    config: Config,
    jobs: usize,
}

impl Default for Program {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Program {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            jobs: default_jobs(),
        }
    }

    /// Limit the number of worker threads used by batch operations
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn compile(&self, path: impl AsRef<Path>) -> Result<CompileReport, SessionError> {
        let unit = SourceUnit::read(path)?;
        Ok(self.compile_source(&unit))
    }

    /// Parse, then resolve, type check and flow check the unit
    pub fn compile_source(&self, unit: &SourceUnit) -> CompileReport {
        let mut session = Session::new(unit, &self.config);
        let module = session.parse();
        session.analyze(module);

        let (errors, warnings) = session
            .finish()
            .into_vec()
            .into_iter()
            .partition(Diagnostic::is_error);
        CompileReport {
            path: unit.path().to_path_buf(),
            errors,
            warnings,
        }
    }

    pub fn format(&self, path: impl AsRef<Path>) -> Result<FormatOutput, SessionError> {
        let unit = SourceUnit::read(path)?;
        self.format_source(&unit)
    }

    /// Produce the canonical text of the unit. Any syntax error blocks
    /// formatting.
    pub fn format_source(&self, unit: &SourceUnit) -> Result<FormatOutput, SessionError> {
        let mut session = Session::new(unit, &self.config);
        let module = session.parse();

        if session.diagnostics().has_errors() {
            session.block();
            return Err(SessionError::FormatBlocked {
                diagnostics: session.finish().into_vec(),
            });
        }

        let module = session.normalize(module);
        let rendered = render(&module, &self.config.style)?;
        let modified = rendered != unit.text();
        let diagnostics = session.finish().into_vec();

        Ok(FormatOutput {
            text: unit.restore_encoding(rendered),
            modified,
            diagnostics,
        })
    }

    /// Compile many files concurrently; results are in input order
    pub fn compile_batch<P>(&self, paths: &[P]) -> Vec<Result<CompileReport, SessionError>>
    where
        P: AsRef<Path> + Sync,
    {
        let results = map_ordered(paths, self.jobs, |path| self.compile(path));
        settle(paths.iter().map(|p| p.as_ref()), results)
    }

    /// Compile already loaded units concurrently. A unit fails only when its
    /// session panicked.
    pub fn compile_units(&self, units: &[SourceUnit]) -> Vec<Result<CompileReport, SessionError>> {
        let results = map_ordered(units, self.jobs, |unit| {
            Ok::<_, SessionError>(self.compile_source(unit))
        });
        settle(units.iter().map(SourceUnit::path), results)
    }

    /// Format many files concurrently; results are in input order
    pub fn format_batch<P>(&self, paths: &[P]) -> Vec<Result<FormatOutput, SessionError>>
    where
        P: AsRef<Path> + Sync,
    {
        let results = map_ordered(paths, self.jobs, |path| self.format(path));
        settle(paths.iter().map(|p| p.as_ref()), results)
    }

    pub fn format_units(&self, units: &[SourceUnit]) -> Vec<Result<FormatOutput, SessionError>> {
        let results = map_ordered(units, self.jobs, |unit| self.format_source(unit));
        settle(units.iter().map(SourceUnit::path), results)
    }
}

/// Turn a worker panic into a failure of that one input
fn settle<'p, T>(
    paths: impl Iterator<Item = &'p Path>,
    results: Vec<Result<Result<T, SessionError>, String>>,
) -> Vec<Result<T, SessionError>> {
    paths
        .zip(results)
        .map(|(path, result)| {
            result.unwrap_or_else(|message| {
                error!(
                    target: "pipeline",
                    path = %path.display(),
                    %message,
                    "session panicked"
                );
                Err(SessionError::Panicked {
                    path: path.to_path_buf(),
                    message,
                })
            })
        })
        .collect()
}
