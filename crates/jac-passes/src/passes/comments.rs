//! Comment normalization

use jac_ast::visit::{walk_block, walk_module, walk_statement, VisitMut};
use jac_ast::{Block, Module, Statement};

use crate::{Pass, PassContext};

/// Trims trailing whitespace and puts one space between the `#` marker and
/// the comment text
pub struct NormalizeComments;

impl Pass for NormalizeComments {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn run(&self, mut module: Module, cx: &mut PassContext<'_>) -> Module {
        if cx.style().normalize_comments {
            Normalizer.visit_module(&mut module);
        }
        module
    }
}

/// Normalize the text of a single comment, `#` included
///
/// Shebang lines (`#!`) and a lone `#` are left as they are; a run of `#`
/// markers is kept together (`##foo` becomes `## foo`).
pub fn normalize_comment(comment: &str) -> String {
    let comment = comment.trim_end();
    if comment.starts_with("#!") {
        return comment.to_string();
    }
    let body = comment.trim_start_matches('#');
    let markers = &comment[..comment.len() - body.len()];
    let body = body.trim_start();
    if body.is_empty() {
        markers.to_string()
    } else {
        format!("{} {}", markers, body)
    }
}

struct Normalizer;

fn normalize_all(comments: &mut [String]) {
    for comment in comments {
        *comment = normalize_comment(comment);
    }
}

impl VisitMut for Normalizer {
    fn visit_module(&mut self, module: &mut Module) {
        normalize_all(&mut module.dangling_comments);
        walk_module(self, module);
    }

    fn visit_block(&mut self, block: &mut Block) {
        normalize_all(&mut block.dangling_comments);
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &mut Statement) {
        normalize_all(&mut stmt.trivia.leading_comments);
        if let Some(comment) = &mut stmt.trivia.trailing_comment {
            *comment = normalize_comment(comment);
        }
        walk_statement(self, stmt);
    }
}
