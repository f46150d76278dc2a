#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use jac::ast::visit::{walk_block, walk_expr, walk_module, walk_statement, VisitMut};
use jac::ast::{Block, Expr, Module, Span, Statement, StatementKind, Trivia, TypeExpr};
use jac::compiler::{Config, FormatOutput, Program, SessionError, SourceUnit};
use jac::diagnostics::Diagnostics;
use jac_passes::{format_pipeline, PassContext};

/// Path of a file under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

pub fn unit(text: &str) -> SourceUnit {
    SourceUnit::new("input.jac", text)
}

pub fn format_source(text: &str) -> Result<FormatOutput, SessionError> {
    Program::default().format_source(&unit(text))
}

/// Canonical text, panicking when formatting is blocked
pub fn format_text(text: &str) -> String {
    match format_source(text) {
        Ok(output) => output.text,
        Err(err) => panic!("formatting failed: {}\n{:?}", err, err.diagnostics()),
    }
}

/// Tree shape of the source: no spans, trivia or inferred types
pub fn shape(text: &str) -> Module {
    let mut module = jac::parser::parse(text).expect("source should parse");
    Eraser.visit_module(&mut module);
    module
}

/// Tree shape after the normalization passes
pub fn normalized_shape(text: &str) -> Module {
    let module = jac::parser::parse(text).expect("source should parse");
    let mut diagnostics = Diagnostics::new();
    let style = Config::default().style;
    let mut cx = PassContext::new(&mut diagnostics, &style);
    let mut module = format_pipeline().run(module, &mut cx);
    Eraser.visit_module(&mut module);
    module
}

/// Clears everything the printer is allowed to change
struct Eraser;

impl VisitMut for Eraser {
    fn visit_module(&mut self, module: &mut Module) {
        module.span = Span::dummy();
        module.dangling_comments.clear();
        walk_module(self, module);
    }

    fn visit_block(&mut self, block: &mut Block) {
        block.span = Span::dummy();
        block.dangling_comments.clear();
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &mut Statement) {
        stmt.span = Span::dummy();
        stmt.trivia = Trivia::default();
        match &mut stmt.kind {
            StatementKind::Function(func) => {
                func.name_span = Span::dummy();
                for param in &mut func.params {
                    param.span = Span::dummy();
                }
            }
            StatementKind::Assign(assign) => assign.inferred = None,
            StatementKind::If { branches, .. } => {
                for branch in branches {
                    branch.span = Span::dummy();
                }
            }
            StatementKind::For { binding_span, .. } => *binding_span = Span::dummy(),
            _ => {}
        }
        walk_statement(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        expr.span = Span::dummy();
        walk_expr(self, expr);
    }

    fn visit_type(&mut self, ty: &mut TypeExpr) {
        ty.span = Span::dummy();
        if let Some(arg) = &mut ty.arg {
            self.visit_type(arg);
        }
    }
}
