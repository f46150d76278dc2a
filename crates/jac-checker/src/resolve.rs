//! Name resolution
//!
//! Functions and imports are visible throughout the module. Variables are
//! visible once assigned: at module level strictly in textual order, inside
//! function bodies locals first and then any module-level variable, since
//! function bodies run after the module has been set up.

use std::collections::HashSet;

use jac_ast::{Block, Expr, ExprKind, FunctionDecl, Module, Span, Statement, StatementKind, TypeExpr};
use jac_diagnostics::Severity;
use jac_passes::{Pass, PassContext};

use crate::{CheckError, CheckWarning, SymbolKind, SymbolTable, Type};

const KNOWN_TYPES: &[&str] = &["int", "float", "str", "bool", "none", "any", "fn", "list"];

pub struct Resolve;

impl Pass for Resolve {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn run(&self, module: Module, cx: &mut PassContext<'_>) -> Module {
        Resolver::new(cx).resolve_module(&module);
        module
    }
}

struct Resolver<'c, 'a> {
    cx: &'c mut PassContext<'a>,
    symbols: SymbolTable,
    /// Every name assigned at module level, wherever it appears
    module_globals: HashSet<String>,
    in_function: bool,
}

impl<'c, 'a> Resolver<'c, 'a> {
    fn new(cx: &'c mut PassContext<'a>) -> Self {
        Self {
            cx,
            symbols: SymbolTable::new(),
            module_globals: HashSet::new(),
            in_function: false,
        }
    }

    fn error(&mut self, error: CheckError, span: Span) {
        self.cx.error(error.to_string(), span);
    }

    fn warning(&mut self, warning: CheckWarning, span: Span) {
        self.cx.warning(warning.to_string(), span);
    }

    fn resolve_module(&mut self, module: &Module) {
        self.symbols.enter_scope();

        // First pass: hoist functions and imports
        for stmt in &module.statements {
            self.collect_declaration(stmt);
        }
        collect_assigned(&module.statements, &mut self.module_globals);

        // Second pass: resolve in source order
        for stmt in &module.statements {
            self.resolve_statement(stmt);
        }

        for id in self.symbols.exit_scope() {
            let Some(symbol) = self.symbols.get(id) else {
                continue;
            };
            if symbol.kind == SymbolKind::Import && !symbol.used {
                let (name, span) = (symbol.name.clone(), symbol.span);
                self.warning(CheckWarning::UnusedImport { name }, span);
            }
        }
    }

    fn collect_declaration(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Function(func) => {
                let existing = self.symbols.lookup_local(&func.name).map(|s| s.kind);
                if existing == Some(SymbolKind::Function) {
                    self.error(
                        CheckError::DuplicateFunction {
                            name: func.name.clone(),
                        },
                        func.name_span,
                    );
                } else {
                    self.symbols
                        .define(&func.name, SymbolKind::Function, Type::Any, func.name_span);
                }
            }
            StatementKind::Import(import) => {
                for name in import.bound_names() {
                    let existing = self.symbols.lookup_local(&name).map(|s| s.kind);
                    if existing == Some(SymbolKind::Import) {
                        self.warning(CheckWarning::DuplicateImport { name }, stmt.span);
                    } else {
                        self.symbols
                            .define(&name, SymbolKind::Import, Type::Any, stmt.span);
                    }
                }
            }
            _ => {}
        }
    }

    fn resolve_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.resolve_statement(stmt);
        }
    }

    fn resolve_statement(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Import(_) => {}
            StatementKind::Function(func) => self.resolve_function(func),
            StatementKind::Assign(assign) => {
                if let Some(ty) = &assign.annotation {
                    self.check_type(ty);
                }
                self.resolve_expr(&assign.value);
                match &assign.target.kind {
                    ExprKind::Ident(name) => {
                        if assign.op.is_some() {
                            self.resolve_name(name, assign.target.span);
                        }
                        self.define_variable(name, assign.target.span);
                    }
                    _ => self.resolve_expr(&assign.target),
                }
            }
            StatementKind::Return(value) => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            StatementKind::If {
                branches,
                else_branch,
            } => {
                for branch in branches {
                    self.resolve_expr(&branch.condition);
                    self.resolve_block(&branch.body);
                }
                if let Some(block) = else_branch {
                    self.resolve_block(block);
                }
            }
            StatementKind::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_block(body);
            }
            StatementKind::For {
                binding,
                binding_span,
                iterable,
                body,
            } => {
                self.resolve_expr(iterable);
                self.define_variable(binding, *binding_span);
                self.resolve_block(body);
            }
            StatementKind::Expr(expr) => self.resolve_expr(expr),
            StatementKind::Break | StatementKind::Continue | StatementKind::Error => {}
        }
    }

    fn resolve_function(&mut self, func: &FunctionDecl) {
        for param in &func.params {
            if let Some(ty) = &param.ty {
                self.check_type(ty);
            }
        }
        if let Some(ty) = &func.return_type {
            self.check_type(ty);
        }

        self.symbols.enter_scope();
        for param in &func.params {
            if self.symbols.lookup_local(&param.name).is_some() {
                self.error(
                    CheckError::DuplicateParameter {
                        name: param.name.clone(),
                    },
                    param.span,
                );
            } else {
                self.symbols
                    .define(&param.name, SymbolKind::Parameter, Type::Any, param.span);
            }
        }

        let outer = std::mem::replace(&mut self.in_function, true);
        self.resolve_block(&func.body);
        self.in_function = outer;

        for id in self.symbols.exit_scope() {
            let Some(symbol) = self.symbols.get(id) else {
                continue;
            };
            if symbol.kind == SymbolKind::Variable && !symbol.used && !symbol.name.starts_with('_')
            {
                let (name, span) = (symbol.name.clone(), symbol.span);
                self.warning(CheckWarning::UnusedVariable { name }, span);
            }
        }
    }

    fn define_variable(&mut self, name: &str, span: Span) {
        let existing = self.symbols.lookup_local(name).map(|s| s.kind);
        if matches!(existing, Some(SymbolKind::Variable | SymbolKind::Parameter)) {
            return;
        }
        self.symbols.define(name, SymbolKind::Variable, Type::Any, span);
    }

    fn resolve_name(&mut self, name: &str, span: Span) {
        if let Some(id) = self.symbols.lookup(name).map(|s| s.id) {
            self.symbols.mark_used(id);
            return;
        }
        if self.module_globals.contains(name) {
            if self.in_function {
                return;
            }
            let error = CheckError::UndefinedName {
                name: name.to_string(),
            };
            self.cx.report_with_note(
                Severity::Error,
                error.to_string(),
                span,
                format!("'{}' is assigned later in the module", name),
            );
            return;
        }
        self.error(
            CheckError::UndefinedName {
                name: name.to_string(),
            },
            span,
        );
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(_) | ExprKind::Error => {}
            ExprKind::Ident(name) => self.resolve_name(name, expr.span),
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::Call { callee, args } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            ExprKind::Field { object, .. } => self.resolve_expr(object),
            ExprKind::Index { object, index } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }
            ExprKind::List(items) => {
                for item in items {
                    self.resolve_expr(item);
                }
            }
        }
    }

    fn check_type(&mut self, ty: &TypeExpr) {
        if !KNOWN_TYPES.contains(&ty.name.as_str()) {
            self.error(
                CheckError::UnknownType {
                    name: ty.name.clone(),
                },
                ty.span,
            );
            return;
        }
        if let Some(arg) = &ty.arg {
            if ty.name != "list" {
                self.error(
                    CheckError::UnexpectedTypeArgument {
                        name: ty.name.clone(),
                    },
                    ty.span,
                );
            }
            self.check_type(arg);
        }
    }
}

/// Names bound by assignments and loops outside function bodies
fn collect_assigned(statements: &[Statement], names: &mut HashSet<String>) {
    for stmt in statements {
        match &stmt.kind {
            StatementKind::Assign(assign) if assign.op.is_none() => {
                if let ExprKind::Ident(name) = &assign.target.kind {
                    names.insert(name.clone());
                }
            }
            StatementKind::If {
                branches,
                else_branch,
            } => {
                for branch in branches {
                    collect_assigned(&branch.body.statements, names);
                }
                if let Some(block) = else_branch {
                    collect_assigned(&block.statements, names);
                }
            }
            StatementKind::While { body, .. } => collect_assigned(&body.statements, names),
            StatementKind::For { binding, body, .. } => {
                names.insert(binding.clone());
                collect_assigned(&body.statements, names);
            }
            _ => {}
        }
    }
}
