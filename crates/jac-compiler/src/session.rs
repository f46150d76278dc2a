//! One compile or format run over a single source unit

use std::time::Instant;

use jac_ast::Module;
use jac_diagnostics::Diagnostics;
use jac_passes::{format_pipeline, PassContext, Pipeline};
use tracing::{debug, info};

use crate::{Config, SourceUnit};

/// Where a session is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Parsed,
    /// Errors were found and later passes did not run
    ParsedWithErrors,
    Analyzed,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Parsed => "parsed",
            Stage::ParsedWithErrors => "parsed-with-errors",
            Stage::Analyzed => "analyzed",
            Stage::Done => "done",
        }
    }
}

/// Owns the diagnostics of one run. Dropped when the run returns; nothing
/// is shared between sessions.
pub struct Session<'p> {
    unit: &'p SourceUnit,
    config: &'p Config,
    diagnostics: Diagnostics,
    stage: Stage,
    started: Instant,
}

impl<'p> Session<'p> {
    pub fn new(unit: &'p SourceUnit, config: &'p Config) -> Self {
        debug!(target: "pipeline", stage = Stage::Start.as_str(), path = %unit.path().display());
        Self {
            unit,
            config,
            diagnostics: Diagnostics::new(),
            stage: Stage::Start,
            started: Instant::now(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn enter(&mut self, stage: Stage) {
        debug!(
            target: "pipeline",
            stage = stage.as_str(),
            from = self.stage.as_str(),
            path = %self.unit.path().display(),
            diagnostics = self.diagnostics.len()
        );
        self.stage = stage;
    }

    /// Lex and parse; syntax errors become diagnostics
    pub fn parse(&mut self) -> Module {
        let module = jac_parser::parse_into(self.unit.text(), &mut self.diagnostics);
        self.enter(Stage::Parsed);
        module
    }

    /// Run the compile schedule unless parsing hit a fatal error
    pub fn analyze(&mut self, module: Module) -> Module {
        if self.diagnostics.has_fatal() {
            self.enter(Stage::ParsedWithErrors);
            return module;
        }
        let module = self.run(&jac_checker::compile_pipeline(), module);
        self.enter(Stage::Analyzed);
        module
    }

    /// Stop after parsing because errors block further work
    pub fn block(&mut self) {
        self.enter(Stage::ParsedWithErrors);
    }

    /// Run the normalization schedule
    pub fn normalize(&mut self, module: Module) -> Module {
        let module = self.run(&format_pipeline(), module);
        self.enter(Stage::Analyzed);
        module
    }

    fn run(&mut self, pipeline: &Pipeline, module: Module) -> Module {
        let mut cx = PassContext::new(&mut self.diagnostics, &self.config.style);
        pipeline.run(module, &mut cx)
    }

    /// End the session and hand over its diagnostics
    pub fn finish(mut self) -> Diagnostics {
        self.enter(Stage::Done);
        info!(
            target: "pipeline",
            stage = "session.done",
            path = %self.unit.path().display(),
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            elapsed_ms = self.started.elapsed().as_millis() as u64
        );
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_compile_reaches_analyzed() {
        let unit = SourceUnit::new("ok.jac", "x = 1\nprint(x)\n");
        let config = Config::default();
        let mut session = Session::new(&unit, &config);
        let module = session.parse();
        assert_eq!(session.stage(), Stage::Parsed);
        session.analyze(module);
        assert_eq!(session.stage(), Stage::Analyzed);
        assert!(session.finish().is_empty());
    }

    #[test]
    fn test_fatal_parse_skips_analysis() {
        let source = format!("x = {}1{}", "(".repeat(200), ")".repeat(200));
        let unit = SourceUnit::new("deep.jac", source);
        let config = Config::default();
        let mut session = Session::new(&unit, &config);
        let module = session.parse();
        session.analyze(module);
        assert_eq!(session.stage(), Stage::ParsedWithErrors);
        let diagnostics = session.finish();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.has_fatal());
    }
}
