//! Type inference and checking
//!
//! Names the resolver could not find type as `Error`, which is compatible
//! with everything, so an undefined name is reported once rather than at
//! every use.

use jac_ast::{
    AssignStmt, BinaryOp, Block, Expr, ExprKind, FunctionDecl, Literal, Module, Span, Statement,
    StatementKind, UnaryOp,
};
use jac_passes::{Pass, PassContext};

use crate::{CheckError, SymbolKind, SymbolTable, Type};

pub struct TypeCheck;

impl Pass for TypeCheck {
    fn name(&self) -> &'static str {
        "typeck"
    }

    fn run(&self, mut module: Module, cx: &mut PassContext<'_>) -> Module {
        TypeChecker::new(cx).check_module(&mut module);
        module
    }
}

struct TypeChecker<'c, 'a> {
    cx: &'c mut PassContext<'a>,
    symbols: SymbolTable,
    /// Declared return type of the function being checked
    return_type: Option<Type>,
}

impl<'c, 'a> TypeChecker<'c, 'a> {
    fn new(cx: &'c mut PassContext<'a>) -> Self {
        Self {
            cx,
            symbols: SymbolTable::new(),
            return_type: None,
        }
    }

    fn error(&mut self, error: CheckError, span: Span) {
        self.cx.error(error.to_string(), span);
    }

    fn mismatch(&mut self, expected: &Type, found: &Type, span: Span) {
        self.error(
            CheckError::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
            span,
        );
    }

    fn check_module(&mut self, module: &mut Module) {
        self.symbols.enter_scope();

        // Function signatures and imports are visible everywhere
        for stmt in &module.statements {
            match &stmt.kind {
                StatementKind::Function(func) => {
                    let ty = function_type(func);
                    self.symbols
                        .define(&func.name, SymbolKind::Function, ty, func.name_span);
                }
                StatementKind::Import(import) => {
                    for name in import.bound_names() {
                        self.symbols
                            .define(&name, SymbolKind::Import, Type::Any, stmt.span);
                    }
                }
                _ => {}
            }
        }

        for stmt in &mut module.statements {
            self.check_statement(stmt);
        }

        self.symbols.exit_scope();
    }

    fn check_block(&mut self, block: &mut Block) {
        for stmt in &mut block.statements {
            self.check_statement(stmt);
        }
    }

    fn check_statement(&mut self, stmt: &mut Statement) {
        let span = stmt.span;
        match &mut stmt.kind {
            StatementKind::Import(_) | StatementKind::Error => {}
            StatementKind::Break | StatementKind::Continue => {}
            StatementKind::Function(func) => self.check_function(func),
            StatementKind::Assign(assign) => self.check_assign(assign, span),
            StatementKind::Return(value) => {
                let found = match value.as_ref() {
                    Some(value) => self.check_expr(value),
                    None => Type::None,
                };
                if let Some(expected) = self.return_type.clone() {
                    if !found.is_assignable_to(&expected) {
                        let at = value.as_ref().map(|v| v.span).unwrap_or(span);
                        self.mismatch(&expected, &found, at);
                    }
                }
            }
            StatementKind::If {
                branches,
                else_branch,
            } => {
                for branch in branches {
                    self.check_expr(&branch.condition);
                    self.check_block(&mut branch.body);
                }
                if let Some(block) = else_branch {
                    self.check_block(block);
                }
            }
            StatementKind::While { condition, body } => {
                self.check_expr(condition);
                self.check_block(body);
            }
            StatementKind::For {
                binding,
                binding_span,
                iterable,
                body,
            } => {
                let iterable_ty = self.check_expr(iterable);
                let elem = match iterable_ty {
                    Type::List(elem) => *elem,
                    Type::Str => Type::Str,
                    Type::Any => Type::Any,
                    Type::Error => Type::Error,
                    other => {
                        self.error(
                            CheckError::NotIterable {
                                ty: other.to_string(),
                            },
                            iterable.span,
                        );
                        Type::Error
                    }
                };
                self.bind(binding, elem, *binding_span);
                self.check_block(body);
            }
            StatementKind::Expr(expr) => {
                self.check_expr(expr);
            }
        }
    }

    fn check_function(&mut self, func: &mut FunctionDecl) {
        self.symbols.enter_scope();
        for param in &func.params {
            let declared = param.ty.as_ref().map(annotation_type);
            let id = self.symbols.define(
                &param.name,
                SymbolKind::Parameter,
                declared.clone().unwrap_or(Type::Any),
                param.span,
            );
            if let Some(symbol) = self.symbols.get_mut(id) {
                symbol.annotated = declared.is_some();
            }
        }

        let declared_return = func.return_type.as_ref().map(annotation_type);
        let outer = std::mem::replace(&mut self.return_type, declared_return);
        self.check_block(&mut func.body);
        self.return_type = outer;

        self.symbols.exit_scope();
    }

    fn check_assign(&mut self, assign: &mut AssignStmt, span: Span) {
        let value_ty = self.check_expr(&assign.value);

        let name = match &assign.target.kind {
            ExprKind::Ident(name) => name.clone(),
            ExprKind::Index { object, index } => {
                let slot = self.check_index(object, index, assign.target.span);
                let stored = match assign.op {
                    Some(op) => self.binary_type(op, &slot, &value_ty, span),
                    None => value_ty,
                };
                if !stored.is_assignable_to(&slot) {
                    self.mismatch(&slot, &stored, assign.value.span);
                }
                return;
            }
            _ => {
                self.check_expr(&assign.target);
                return;
            }
        };

        let existing = self
            .symbols
            .lookup_local(&name)
            .filter(|s| matches!(s.kind, SymbolKind::Variable | SymbolKind::Parameter))
            .map(|s| (s.ty.clone(), s.annotated));

        let stored = match assign.op {
            Some(op) => {
                let current = self
                    .symbols
                    .lookup(&name)
                    .map(|s| s.ty.clone())
                    .unwrap_or(Type::Error);
                self.binary_type(op, &current, &value_ty, span)
            }
            None => value_ty,
        };

        let declared = match &assign.annotation {
            Some(annotation) => Some(annotation_type(annotation)),
            None => existing
                .as_ref()
                .filter(|(_, annotated)| *annotated)
                .map(|(ty, _)| ty.clone()),
        };

        let var_ty = match declared {
            Some(declared) => {
                if !stored.is_assignable_to(&declared) {
                    self.mismatch(&declared, &stored, assign.value.span);
                }
                self.bind_annotated(&name, declared.clone(), assign.target.span);
                declared
            }
            None => {
                self.bind(&name, stored.clone(), assign.target.span);
                stored
            }
        };

        if assign.op.is_none() {
            assign.inferred = var_ty.to_type_expr(assign.target.span);
        }
    }

    /// Bind a name in the innermost scope, updating an existing variable
    fn bind(&mut self, name: &str, ty: Type, span: Span) {
        let existing = self
            .symbols
            .lookup_local(name)
            .filter(|s| matches!(s.kind, SymbolKind::Variable | SymbolKind::Parameter))
            .map(|s| s.id);
        match existing.and_then(|id| self.symbols.get_mut(id)) {
            Some(symbol) if !symbol.annotated => symbol.ty = ty,
            Some(_) => {}
            None => {
                self.symbols.define(name, SymbolKind::Variable, ty, span);
            }
        }
    }

    fn bind_annotated(&mut self, name: &str, ty: Type, span: Span) {
        let existing = self
            .symbols
            .lookup_local(name)
            .filter(|s| matches!(s.kind, SymbolKind::Variable | SymbolKind::Parameter))
            .map(|s| s.id);
        let id = match existing {
            Some(id) => id,
            None => self.symbols.define(name, SymbolKind::Variable, ty.clone(), span),
        };
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.ty = ty;
            symbol.annotated = true;
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Literal(lit) => match lit {
                Literal::Int(_) => Type::Int,
                Literal::Float(_) => Type::Float,
                Literal::Str(_) => Type::Str,
                Literal::Bool(_) => Type::Bool,
                Literal::None => Type::None,
            },
            ExprKind::Ident(name) => self
                .symbols
                .lookup(name)
                .map(|s| s.ty.clone())
                .unwrap_or(Type::Error),
            ExprKind::Binary { op, left, right } => {
                let left = self.check_expr(left);
                let right = self.check_expr(right);
                self.binary_type(*op, &left, &right, expr.span)
            }
            ExprKind::Unary { op, operand } => {
                let operand_ty = self.check_expr(operand);
                match op {
                    UnaryOp::Not => Type::Bool,
                    UnaryOp::Neg if operand_ty.is_numeric() || operand_ty.is_unknown() => {
                        operand_ty
                    }
                    UnaryOp::Neg => {
                        self.error(
                            CheckError::InvalidOperand {
                                op: op.symbol(),
                                operand: operand_ty.to_string(),
                            },
                            expr.span,
                        );
                        Type::Error
                    }
                }
            }
            ExprKind::Call { callee, args } => self.check_call(callee, args, expr.span),
            ExprKind::Field { object, .. } => {
                self.check_expr(object);
                Type::Any
            }
            ExprKind::Index { object, index } => self.check_index(object, index, expr.span),
            ExprKind::List(items) => {
                let mut elem: Option<Type> = None;
                for item in items {
                    let ty = self.check_expr(item);
                    elem = Some(match elem {
                        None => ty,
                        Some(prev) => join(prev, ty),
                    });
                }
                Type::list(elem.unwrap_or(Type::Any))
            }
            ExprKind::Error => Type::Error,
        }
    }

    fn check_index(&mut self, object: &Expr, index: &Expr, span: Span) -> Type {
        let object_ty = self.check_expr(object);
        let index_ty = self.check_expr(index);

        let result = match &object_ty {
            Type::List(elem) => (**elem).clone(),
            Type::Str => Type::Str,
            Type::Any | Type::Error => return object_ty,
            other => {
                self.error(
                    CheckError::NotIndexable {
                        ty: other.to_string(),
                    },
                    span,
                );
                return Type::Error;
            }
        };
        if !index_ty.is_assignable_to(&Type::Int) {
            self.mismatch(&Type::Int, &index_ty, index.span);
        }
        result
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_expr(arg)).collect();

        if let ExprKind::Ident(name) = &callee.kind {
            let builtin = self
                .symbols
                .lookup(name)
                .filter(|s| s.kind == SymbolKind::Builtin)
                .map(|s| s.ty.clone());
            if let Some(signature) = builtin {
                return self.check_builtin_call(name, signature, args, &arg_types, span);
            }
        }

        let callee_ty = self.check_expr(callee);
        match callee_ty {
            Type::Fn {
                params: Some(params),
                ret,
            } => {
                if params.len() != args.len() {
                    self.error(
                        CheckError::ArityMismatch {
                            name: callee_name(callee),
                            expected: params.len().to_string(),
                            found: args.len(),
                        },
                        span,
                    );
                } else {
                    self.check_arguments(&params, args, &arg_types);
                }
                *ret
            }
            Type::Fn { params: None, ret } => *ret,
            Type::Any | Type::Error => callee_ty,
            other => {
                self.error(
                    CheckError::NotCallable {
                        ty: other.to_string(),
                    },
                    callee.span,
                );
                Type::Error
            }
        }
    }

    fn check_arguments(&mut self, params: &[Type], args: &[Expr], arg_types: &[Type]) {
        for ((param, arg), arg_ty) in params.iter().zip(args).zip(arg_types) {
            if !arg_ty.is_assignable_to(param) {
                self.mismatch(param, arg_ty, arg.span);
            }
        }
    }

    fn check_builtin_call(
        &mut self,
        name: &str,
        signature: Type,
        args: &[Expr],
        arg_types: &[Type],
        span: Span,
    ) -> Type {
        let Type::Fn { ret, .. } = signature else {
            return Type::Any;
        };

        let (min, max) = match name {
            "print" => (0, usize::MAX),
            "range" => (1, 3),
            _ => (1, 1),
        };
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            self.error(
                CheckError::ArityMismatch {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                },
                span,
            );
            return *ret;
        }

        for (arg, ty) in args.iter().zip(arg_types) {
            let accepted = match name {
                "len" => matches!(ty, Type::Str | Type::List(_)),
                "int" | "float" => matches!(ty, Type::Int | Type::Float | Type::Str | Type::Bool),
                "range" => ty.is_assignable_to(&Type::Int),
                _ => true,
            };
            if !accepted && !ty.is_unknown() {
                let expected = match name {
                    "len" => "str or list",
                    "range" => "int",
                    _ => "int, float, str or bool",
                };
                self.error(
                    CheckError::TypeMismatch {
                        expected: expected.to_string(),
                        found: ty.to_string(),
                    },
                    arg.span,
                );
            }
        }
        *ret
    }

    fn binary_type(&mut self, op: BinaryOp, left: &Type, right: &Type, span: Span) -> Type {
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        match binary_result(op, left, right) {
            Some(ty) => ty,
            None => {
                self.error(
                    CheckError::InvalidOperands {
                        op: op.symbol(),
                        left: left.to_string(),
                        right: right.to_string(),
                    },
                    span,
                );
                Type::Error
            }
        }
    }
}

/// Result type of a binary operation, or `None` when the operands are
/// not supported
fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    use BinaryOp::*;

    let numeric = |l: &Type, r: &Type| match (l, r) {
        (Type::Int, Type::Int) => Some(Type::Int),
        (l, r) if l.is_numeric() && r.is_numeric() => Some(Type::Float),
        _ => None,
    };

    match op {
        And | Or => Some(join(left.clone(), right.clone())),
        Eq | Ne => Some(Type::Bool),
        Lt | Le | Gt | Ge => {
            let comparable = left.is_unknown()
                || right.is_unknown()
                || (left.is_numeric() && right.is_numeric())
                || (*left == Type::Str && *right == Type::Str);
            comparable.then_some(Type::Bool)
        }
        _ if left.is_unknown() || right.is_unknown() => Some(Type::Any),
        Add => match (left, right) {
            (Type::Str, Type::Str) => Some(Type::Str),
            (Type::List(a), Type::List(b)) => {
                if b.is_assignable_to(a) {
                    Some(left.clone())
                } else if a.is_assignable_to(b) {
                    Some(right.clone())
                } else {
                    None
                }
            }
            _ => numeric(left, right),
        },
        Mul => match (left, right) {
            (Type::Str, Type::Int) | (Type::Int, Type::Str) => Some(Type::Str),
            (Type::List(_), Type::Int) => Some(left.clone()),
            (Type::Int, Type::List(_)) => Some(right.clone()),
            _ => numeric(left, right),
        },
        Sub | Mod => numeric(left, right),
        Div => numeric(left, right).map(|_| Type::Float),
    }
}

/// Common type of two values that may flow into the same place
fn join(a: Type, b: Type) -> Type {
    if a == b {
        a
    } else if a.is_numeric() && b.is_numeric() {
        Type::Float
    } else if a.is_error() || b.is_error() {
        Type::Error
    } else {
        Type::Any
    }
}

fn annotation_type(ty: &jac_ast::TypeExpr) -> Type {
    // Unknown names were reported by the resolver
    Type::from_annotation(ty).unwrap_or(Type::Any)
}

fn function_type(func: &FunctionDecl) -> Type {
    let params = func
        .params
        .iter()
        .map(|p| p.ty.as_ref().map(annotation_type).unwrap_or(Type::Any))
        .collect();
    let ret = func
        .return_type
        .as_ref()
        .map(annotation_type)
        .unwrap_or(Type::Any);
    Type::function(params, ret)
}

fn callee_name(callee: &Expr) -> String {
    match &callee.kind {
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Field { field, .. } => field.clone(),
        _ => "function".to_string(),
    }
}
