//! In-place traversal of the AST
//!
//! Implementors override the hooks they care about and call the matching
//! `walk_*` function to keep descending.

use crate::{Block, Expr, ExprKind, Module, Statement, StatementKind, TypeExpr};

pub trait VisitMut {
    fn visit_module(&mut self, module: &mut Module) {
        walk_module(self, module);
    }

    fn visit_block(&mut self, block: &mut Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &mut Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        walk_expr(self, expr);
    }

    fn visit_type(&mut self, _ty: &mut TypeExpr) {}
}

pub fn walk_module<V: VisitMut + ?Sized>(v: &mut V, module: &mut Module) {
    for stmt in &mut module.statements {
        v.visit_statement(stmt);
    }
}

pub fn walk_block<V: VisitMut + ?Sized>(v: &mut V, block: &mut Block) {
    for stmt in &mut block.statements {
        v.visit_statement(stmt);
    }
}

pub fn walk_statement<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Statement) {
    match &mut stmt.kind {
        StatementKind::Import(_) | StatementKind::Break | StatementKind::Continue => {}
        StatementKind::Function(func) => {
            for param in &mut func.params {
                if let Some(ty) = &mut param.ty {
                    v.visit_type(ty);
                }
            }
            if let Some(ty) = &mut func.return_type {
                v.visit_type(ty);
            }
            v.visit_block(&mut func.body);
        }
        StatementKind::Assign(assign) => {
            v.visit_expr(&mut assign.target);
            if let Some(ty) = &mut assign.annotation {
                v.visit_type(ty);
            }
            v.visit_expr(&mut assign.value);
        }
        StatementKind::Return(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        StatementKind::If {
            branches,
            else_branch,
        } => {
            for branch in branches {
                v.visit_expr(&mut branch.condition);
                v.visit_block(&mut branch.body);
            }
            if let Some(block) = else_branch {
                v.visit_block(block);
            }
        }
        StatementKind::While { condition, body } => {
            v.visit_expr(condition);
            v.visit_block(body);
        }
        StatementKind::For { iterable, body, .. } => {
            v.visit_expr(iterable);
            v.visit_block(body);
        }
        StatementKind::Expr(expr) => v.visit_expr(expr),
        StatementKind::Error => {}
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::Error => {}
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Call { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Field { object, .. } => v.visit_expr(object),
        ExprKind::Index { object, index } => {
            v.visit_expr(object);
            v.visit_expr(index);
        }
        ExprKind::List(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
    }
}
