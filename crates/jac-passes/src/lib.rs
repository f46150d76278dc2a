//! Pass pipeline - ordered module-to-module transformations
//!
//! A pass takes the module by value and hands back the (possibly rewritten)
//! module, reporting problems through the shared [`PassContext`]. The
//! pipeline stops early only when a fatal diagnostic appears; ordinary
//! errors never cut the schedule short.
//!
//! # Format passes
//!
//! - **imports**: sorts and deduplicates the leading run of imports
//! - **blank-lines**: clamps blank lines between statements
//! - **comments**: normalizes comment spacing
//!
//! # Usage
//!
//! ```ignore
//! use jac_passes::{format_pipeline, PassContext};
//!
//! let mut cx = PassContext::new(&mut diagnostics, &style);
//! let module = format_pipeline().run(module, &mut cx);
//! ```

pub mod passes;

pub use passes::{BlankLines, NormalizeComments, SortImports};

use std::time::Instant;

use jac_ast::{FormatStyle, Module, Span};
use jac_diagnostics::{Diagnostic, Diagnostics, Severity};
use tracing::debug;

/// A single step of a schedule
pub trait Pass: Send + Sync {
    /// Name recorded on every diagnostic this pass produces
    fn name(&self) -> &'static str;

    fn run(&self, module: Module, cx: &mut PassContext<'_>) -> Module;
}

/// What a pass can see besides the module
pub struct PassContext<'a> {
    diagnostics: &'a mut Diagnostics,
    style: &'a FormatStyle,
    pass: &'static str,
}

impl<'a> PassContext<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics, style: &'a FormatStyle) -> Self {
        Self {
            diagnostics,
            style,
            pass: "",
        }
    }

    pub fn style(&self) -> &FormatStyle {
        self.style
    }

    /// Name of the pass currently running
    pub fn pass_name(&self) -> &'static str {
        self.pass
    }

    pub fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.error(message, span, self.pass);
    }

    pub fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.warning(message, span, self.pass);
    }

    /// Record a diagnostic with a follow-up note
    pub fn report_with_note(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        span: Span,
        note: impl Into<String>,
    ) {
        let diagnostic = Diagnostic::new(severity, message, span, self.pass).with_note(note);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.diagnostics
    }

    fn enter(&mut self, pass: &'static str) {
        self.pass = pass;
    }
}

/// Fixed ordered list of passes
#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pass: impl Pass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn push(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run each pass in sequence, moving the module from one to the next
    pub fn run(&self, mut module: Module, cx: &mut PassContext<'_>) -> Module {
        for pass in &self.passes {
            if cx.diagnostics.has_fatal() {
                debug!(target: "pipeline", stage = "pass.skipped", pass = pass.name());
                break;
            }

            cx.enter(pass.name());
            let before = cx.diagnostics.len();
            let start = Instant::now();
            module = pass.run(module, cx);
            debug!(
                target: "pipeline",
                stage = "pass.done",
                pass = pass.name(),
                diagnostics = cx.diagnostics.len() - before,
                elapsed_ms = start.elapsed().as_millis() as u64
            );
        }
        cx.enter("");
        module
    }
}

/// The normalization schedule used by `format`
pub fn format_pipeline() -> Pipeline {
    Pipeline::new()
        .with(SortImports)
        .with(BlankLines)
        .with(NormalizeComments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jac_ast::{Statement, StatementKind};

    struct Recorder(&'static str);

    impl Pass for Recorder {
        fn name(&self) -> &'static str {
            self.0
        }

        fn run(&self, mut module: Module, cx: &mut PassContext<'_>) -> Module {
            cx.warning(format!("ran {}", self.0), Span::dummy());
            module
                .statements
                .push(Statement::new(StatementKind::Break, Span::dummy()));
            module
        }
    }

    struct FailFatally;

    impl Pass for FailFatally {
        fn name(&self) -> &'static str {
            "fatal"
        }

        fn run(&self, module: Module, cx: &mut PassContext<'_>) -> Module {
            cx.diagnostics.fatal("broken tree", Span::dummy(), "fatal");
            module
        }
    }

    struct FailSoftly;

    impl Pass for FailSoftly {
        fn name(&self) -> &'static str {
            "soft"
        }

        fn run(&self, module: Module, cx: &mut PassContext<'_>) -> Module {
            cx.error("recoverable", Span::dummy());
            module
        }
    }

    #[test]
    fn test_passes_run_in_order_and_receive_the_module() {
        let pipeline = Pipeline::new().with(Recorder("first")).with(Recorder("second"));
        let mut diagnostics = Diagnostics::new();
        let style = FormatStyle::default();
        let mut cx = PassContext::new(&mut diagnostics, &style);

        let module = pipeline.run(Module::default(), &mut cx);

        assert_eq!(module.statements.len(), 2);
        let passes: Vec<_> = diagnostics.all().iter().map(|d| d.pass).collect();
        assert_eq!(passes, vec!["first", "second"]);
    }

    #[test]
    fn test_fatal_stops_the_schedule() {
        let pipeline = Pipeline::new().with(FailFatally).with(Recorder("after"));
        let mut diagnostics = Diagnostics::new();
        let style = FormatStyle::default();
        let mut cx = PassContext::new(&mut diagnostics, &style);

        let module = pipeline.run(Module::default(), &mut cx);

        assert!(module.statements.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_errors_do_not_stop_the_schedule() {
        let pipeline = Pipeline::new().with(FailSoftly).with(Recorder("after"));
        let mut diagnostics = Diagnostics::new();
        let style = FormatStyle::default();
        let mut cx = PassContext::new(&mut diagnostics, &style);

        pipeline.run(Module::default(), &mut cx);

        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_format_schedule_order() {
        assert_eq!(
            format_pipeline().names(),
            vec!["imports", "blank-lines", "comments"]
        );
    }
}
