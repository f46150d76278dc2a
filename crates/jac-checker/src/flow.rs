//! Control-flow checks

use jac_ast::{Block, Expr, ExprKind, FunctionDecl, Literal, Module, Statement, StatementKind};
use jac_passes::{Pass, PassContext};

use crate::{CheckError, CheckWarning, Type};

/// Reports `break`/`continue` outside loops, `return` outside functions,
/// unreachable statements and functions that can fall off the end
/// without returning their declared type
pub struct FlowCheck;

impl Pass for FlowCheck {
    fn name(&self) -> &'static str {
        "flow"
    }

    fn run(&self, module: Module, cx: &mut PassContext<'_>) -> Module {
        let mut flow = Flow {
            cx,
            loop_depth: 0,
            in_function: false,
        };
        flow.check_statements(&module.statements);
        module
    }
}

struct Flow<'c, 'a> {
    cx: &'c mut PassContext<'a>,
    loop_depth: usize,
    in_function: bool,
}

impl Flow<'_, '_> {
    fn check_statements(&mut self, statements: &[Statement]) {
        let mut diverged = false;
        let mut reported = false;
        for stmt in statements {
            if diverged && !reported && !stmt.is_error() {
                self.cx
                    .warning(CheckWarning::Unreachable.to_string(), stmt.span);
                reported = true;
            }
            self.check_statement(stmt);
            if matches!(
                stmt.kind,
                StatementKind::Return(_) | StatementKind::Break | StatementKind::Continue
            ) {
                diverged = true;
            }
        }
    }

    fn check_block(&mut self, block: &Block) {
        self.check_statements(&block.statements);
    }

    fn check_loop_body(&mut self, body: &Block) {
        self.loop_depth += 1;
        self.check_block(body);
        self.loop_depth -= 1;
    }

    fn check_statement(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Break | StatementKind::Continue if self.loop_depth == 0 => {
                let keyword = if matches!(stmt.kind, StatementKind::Break) {
                    "break"
                } else {
                    "continue"
                };
                self.cx
                    .error(CheckError::OutsideLoop { keyword }.to_string(), stmt.span);
            }
            StatementKind::Return(_) if !self.in_function => {
                self.cx
                    .error(CheckError::ReturnOutsideFunction.to_string(), stmt.span);
            }
            StatementKind::Function(func) => self.check_function(func),
            StatementKind::If {
                branches,
                else_branch,
            } => {
                for branch in branches {
                    self.check_block(&branch.body);
                }
                if let Some(block) = else_branch {
                    self.check_block(block);
                }
            }
            StatementKind::While { body, .. } | StatementKind::For { body, .. } => {
                self.check_loop_body(body)
            }
            _ => {}
        }
    }

    fn check_function(&mut self, func: &FunctionDecl) {
        let outer_loops = std::mem::replace(&mut self.loop_depth, 0);
        let outer_function = std::mem::replace(&mut self.in_function, true);
        self.check_block(&func.body);
        self.loop_depth = outer_loops;
        self.in_function = outer_function;

        let Some(declared) = func.return_type.as_ref() else {
            return;
        };
        let must_return = match Type::from_annotation(declared) {
            Some(Type::None) | Some(Type::Any) | None => false,
            Some(_) => true,
        };
        if must_return && !block_always_returns(&func.body) {
            self.cx.error(
                CheckError::MissingReturn {
                    name: func.name.clone(),
                    ty: jac_ast::printer::render_type(declared),
                }
                .to_string(),
                func.name_span,
            );
        }
    }
}

/// Whether every path through the block ends in `return`
pub fn block_always_returns(block: &Block) -> bool {
    block.statements.iter().any(statement_always_returns)
}

fn statement_always_returns(stmt: &Statement) -> bool {
    match &stmt.kind {
        StatementKind::Return(_) => true,
        StatementKind::If {
            branches,
            else_branch: Some(else_block),
        } => {
            branches.iter().all(|b| block_always_returns(&b.body))
                && block_always_returns(else_block)
        }
        // `while true` without a `break` only exits by returning
        StatementKind::While { condition, body } => {
            is_true_literal(condition) && !block_breaks(body)
        }
        _ => false,
    }
}

fn is_true_literal(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Literal(Literal::Bool(true)))
}

/// Whether a `break` in this block leaves the loop that owns it
fn block_breaks(block: &Block) -> bool {
    block.statements.iter().any(|stmt| match &stmt.kind {
        StatementKind::Break => true,
        StatementKind::If {
            branches,
            else_branch,
        } => {
            branches.iter().any(|b| block_breaks(&b.body))
                || else_branch.as_ref().is_some_and(block_breaks)
        }
        // Breaks inside nested loops belong to those loops
        _ => false,
    })
}
