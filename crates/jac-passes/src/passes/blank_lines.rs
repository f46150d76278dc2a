//! Blank line normalization

use jac_ast::visit::{walk_block, walk_module, VisitMut};
use jac_ast::{Block, Module, Statement};

use crate::{Pass, PassContext};

/// Clamps blank lines between statements to `max_blank_lines` and removes
/// them before the first statement of the module and of every block
pub struct BlankLines;

impl Pass for BlankLines {
    fn name(&self) -> &'static str {
        "blank-lines"
    }

    fn run(&self, mut module: Module, cx: &mut PassContext<'_>) -> Module {
        let mut clamp = Clamp {
            max: cx.style().max_blank_lines,
        };
        clamp.visit_module(&mut module);
        module
    }
}

struct Clamp {
    max: u32,
}

impl Clamp {
    fn apply(&self, statements: &mut [Statement]) {
        for (i, stmt) in statements.iter_mut().enumerate() {
            let blank = &mut stmt.trivia.blank_lines_before;
            *blank = if i == 0 { 0 } else { (*blank).min(self.max) };
        }
    }
}

impl VisitMut for Clamp {
    fn visit_module(&mut self, module: &mut Module) {
        self.apply(&mut module.statements);
        walk_module(self, module);
    }

    fn visit_block(&mut self, block: &mut Block) {
        self.apply(&mut block.statements);
        walk_block(self, block);
    }
}
