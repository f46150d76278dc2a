//! Canonical text printer for the Jac AST
//!
//! Serializes a module back to source text. Output depends only on the AST
//! and the [`FormatStyle`], so the same tree always prints byte-identically.
//! Layout rules:
//! - one statement per line, no semicolons
//! - single spaces around binary and assignment operators
//! - strings always double quoted, floats always carry a `.`
//! - parentheses only where operator precedence needs them
//! - a call or list heading a statement is split one element per line
//!   when the statement does not fit in `max_line_length`
//! - blank lines are kept only before a statement's first leading comment;
//!   blank lines between its comments, or between them and the statement,
//!   are dropped
//! - comments written inside the brackets of a statement print above it

use thiserror::Error;

use crate::{
    AssignStmt, Block, Expr, ExprKind, FormatStyle, FunctionDecl, ImportStmt, Literal, Module,
    Parameter, Statement, StatementKind, TypeExpr, UnaryOp,
};

/// Printing only fails on trees the parser marked as broken
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrintError {
    #[error("cannot print an error statement at byte {}", .span.start)]
    ErrorStatement { span: crate::Span },

    #[error("cannot print an error expression at byte {}", .span.start)]
    ErrorExpression { span: crate::Span },
}

/// Render a module as canonical source text
pub fn render(module: &Module, style: &FormatStyle) -> Result<String, PrintError> {
    let mut printer = Printer::new(style);
    printer.print_statements(&module.statements, 0)?;
    for comment in &module.dangling_comments {
        printer.push(0, comment);
    }
    Ok(printer.finish())
}

/// Render a single expression without line breaking
pub fn render_expr(expr: &Expr) -> Result<String, PrintError> {
    expr_to_jac(expr, 0)
}

/// Render a type annotation
pub fn render_type(ty: &TypeExpr) -> String {
    match &ty.arg {
        Some(arg) => format!("{}[{}]", ty.name, render_type(arg)),
        None => ty.name.clone(),
    }
}

struct Printer<'s> {
    style: &'s FormatStyle,
    indent_unit: String,
    lines: Vec<String>,
}

impl<'s> Printer<'s> {
    fn new(style: &'s FormatStyle) -> Self {
        Self {
            style,
            indent_unit: style.indent_unit(),
            lines: Vec::new(),
        }
    }

    fn finish(self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let newline = self.style.newline.as_str();
        let mut out = self.lines.join(newline);
        if self.style.trailing_newline {
            out.push_str(newline);
        }
        out
    }

    fn indent(&self, depth: usize) -> String {
        self.indent_unit.repeat(depth)
    }

    fn push(&mut self, depth: usize, text: &str) {
        let line = format!("{}{}", self.indent(depth), text);
        self.lines.push(line);
    }

    fn append(&mut self, text: &str) {
        match self.lines.last_mut() {
            Some(line) => line.push_str(text),
            None => self.lines.push(text.to_string()),
        }
    }

    fn print_statements(&mut self, statements: &[Statement], depth: usize) -> Result<(), PrintError> {
        for stmt in statements {
            self.print_statement(stmt, depth)?;
        }
        Ok(())
    }

    fn print_statement(&mut self, stmt: &Statement, depth: usize) -> Result<(), PrintError> {
        for _ in 0..stmt.trivia.blank_lines_before {
            self.lines.push(String::new());
        }
        for comment in &stmt.trivia.leading_comments {
            self.push(depth, comment);
        }

        match &stmt.kind {
            StatementKind::Import(import) => self.push(depth, &import_to_jac(import)),
            StatementKind::Function(func) => self.print_function(func, depth)?,
            StatementKind::Assign(assign) => self.print_assign(assign, depth)?,
            StatementKind::Return(value) => match value {
                Some(value) => self.print_expr_line(depth, "return ", value)?,
                None => self.push(depth, "return"),
            },
            StatementKind::Break => self.push(depth, "break"),
            StatementKind::Continue => self.push(depth, "continue"),
            StatementKind::If {
                branches,
                else_branch,
            } => {
                for (i, branch) in branches.iter().enumerate() {
                    let condition = expr_to_jac(&branch.condition, 0)?;
                    if i == 0 {
                        self.push(depth, &format!("if {}", condition));
                    } else {
                        self.append(&format!(" elif {}", condition));
                    }
                    self.print_block(&branch.body, depth)?;
                }
                if let Some(block) = else_branch {
                    self.append(" else");
                    self.print_block(block, depth)?;
                }
            }
            StatementKind::While { condition, body } => {
                self.push(depth, &format!("while {}", expr_to_jac(condition, 0)?));
                self.print_block(body, depth)?;
            }
            StatementKind::For {
                binding,
                iterable,
                body,
                ..
            } => {
                let header = format!("for {} in {}", binding, expr_to_jac(iterable, 0)?);
                self.push(depth, &header);
                self.print_block(body, depth)?;
            }
            StatementKind::Expr(expr) => self.print_expr_line(depth, "", expr)?,
            StatementKind::Error => return Err(PrintError::ErrorStatement { span: stmt.span }),
        }

        if let Some(comment) = &stmt.trivia.trailing_comment {
            self.append(&format!("  {}", comment));
        }
        Ok(())
    }

    fn print_function(&mut self, func: &FunctionDecl, depth: usize) -> Result<(), PrintError> {
        let params = func
            .params
            .iter()
            .map(param_to_jac)
            .collect::<Vec<_>>()
            .join(", ");
        let mut header = format!("fn {}({})", func.name, params);
        if let Some(ret) = &func.return_type {
            header.push_str(" -> ");
            header.push_str(&render_type(ret));
        }
        self.push(depth, &header);
        self.print_block(&func.body, depth)
    }

    fn print_assign(&mut self, assign: &AssignStmt, depth: usize) -> Result<(), PrintError> {
        let mut prefix = expr_to_jac(&assign.target, 0)?;
        if let Some(ty) = &assign.annotation {
            prefix.push_str(": ");
            prefix.push_str(&render_type(ty));
        }
        match assign.op {
            Some(op) => prefix.push_str(&format!(" {}= ", op.symbol())),
            None => prefix.push_str(" = "),
        }
        self.print_expr_line(depth, &prefix, &assign.value)
    }

    /// Opens a block on the current last line and closes it on its own line
    fn print_block(&mut self, block: &Block, depth: usize) -> Result<(), PrintError> {
        if block.is_empty() {
            self.append(" {}");
            return Ok(());
        }
        self.append(" {");
        self.print_statements(&block.statements, depth + 1)?;
        for comment in &block.dangling_comments {
            self.push(depth + 1, comment);
        }
        self.push(depth, "}");
        Ok(())
    }

    fn print_expr_line(&mut self, depth: usize, prefix: &str, expr: &Expr) -> Result<(), PrintError> {
        let flat = expr_to_jac(expr, 0)?;
        let width = self.style.indent_columns(depth)
            + prefix.chars().count()
            + flat.chars().count();
        if width <= self.style.max_line_length {
            self.push(depth, &format!("{}{}", prefix, flat));
            return Ok(());
        }

        match &expr.kind {
            ExprKind::Call { callee, args } if !args.is_empty() => {
                let head = format!("{}{}(", prefix, expr_to_jac(callee, POSTFIX)?);
                self.print_broken(depth, &head, args, ")")
            }
            ExprKind::List(items) if !items.is_empty() => {
                let head = format!("{}[", prefix);
                self.print_broken(depth, &head, items, "]")
            }
            _ => {
                self.push(depth, &format!("{}{}", prefix, flat));
                Ok(())
            }
        }
    }

    fn print_broken(
        &mut self,
        depth: usize,
        head: &str,
        items: &[Expr],
        close: &str,
    ) -> Result<(), PrintError> {
        self.push(depth, head);
        for item in items {
            let text = expr_to_jac(item, 0)?;
            self.push(depth + 1, &format!("{},", text));
        }
        self.push(depth, close);
        Ok(())
    }
}

// ===== Expressions =====

/// Precedence of calls, field access and indexing
const POSTFIX: u8 = 8;
/// Precedence of literals, names and list displays
const ATOM: u8 = 9;

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::Unary { op, .. } => op.precedence(),
        ExprKind::Call { .. } | ExprKind::Field { .. } | ExprKind::Index { .. } => POSTFIX,
        ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::List(_) | ExprKind::Error => ATOM,
    }
}

/// Print `expr`, parenthesized when it binds looser than `min_prec`
fn expr_to_jac(expr: &Expr, min_prec: u8) -> Result<String, PrintError> {
    let text = match &expr.kind {
        ExprKind::Literal(lit) => literal_to_jac(lit),
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Binary { op, left, right } => {
            let prec = op.precedence();
            format!(
                "{} {} {}",
                expr_to_jac(left, prec)?,
                op.symbol(),
                expr_to_jac(right, prec + 1)?
            )
        }
        ExprKind::Unary { op, operand } => {
            let operand = expr_to_jac(operand, op.precedence())?;
            match op {
                UnaryOp::Neg => format!("-{}", operand),
                UnaryOp::Not => format!("not {}", operand),
            }
        }
        ExprKind::Call { callee, args } => {
            let args = args
                .iter()
                .map(|arg| expr_to_jac(arg, 0))
                .collect::<Result<Vec<_>, _>>()?;
            format!("{}({})", expr_to_jac(callee, POSTFIX)?, args.join(", "))
        }
        ExprKind::Field { object, field } => {
            format!("{}.{}", expr_to_jac(object, POSTFIX)?, field)
        }
        ExprKind::Index { object, index } => {
            format!("{}[{}]", expr_to_jac(object, POSTFIX)?, expr_to_jac(index, 0)?)
        }
        ExprKind::List(items) => {
            let items = items
                .iter()
                .map(|item| expr_to_jac(item, 0))
                .collect::<Result<Vec<_>, _>>()?;
            format!("[{}]", items.join(", "))
        }
        ExprKind::Error => return Err(PrintError::ErrorExpression { span: expr.span }),
    };

    if precedence(expr) < min_prec {
        Ok(format!("({})", text))
    } else {
        Ok(text)
    }
}

fn literal_to_jac(lit: &Literal) -> String {
    match lit {
        Literal::Int(value) => value.to_string(),
        Literal::Float(value) => float_to_jac(*value),
        Literal::Str(value) => format!("\"{}\"", escape_string(value)),
        Literal::Bool(true) => "true".to_string(),
        Literal::Bool(false) => "false".to_string(),
        Literal::None => "none".to_string(),
    }
}

/// Shortest round-tripping decimal, always with a fractional part so it
/// re-lexes as a float
fn float_to_jac(value: f64) -> String {
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Escape a string for output (double quotes, newlines, etc.)
fn escape_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\0' => result.push_str("\\0"),
            _ => result.push(c),
        }
    }
    result
}

fn param_to_jac(param: &Parameter) -> String {
    match &param.ty {
        Some(ty) => format!("{}: {}", param.name, render_type(ty)),
        None => param.name.clone(),
    }
}

fn import_to_jac(import: &ImportStmt) -> String {
    match import {
        ImportStmt::Module { path, alias } => match alias {
            Some(alias) => format!("import {} as {}", path.join("."), alias),
            None => format!("import {}", path.join(".")),
        },
        ImportStmt::From { path, names } => {
            format!("from {} import {}", path.join("."), names.join(", "))
        }
    }
}
