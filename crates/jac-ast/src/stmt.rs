//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::{BinaryOp, Expr, Span, TypeExpr};

/// A block of statements: `{ ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    /// Comments after the last statement, before the closing brace
    pub dangling_comments: Vec<String>,
    pub span: Span,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.dangling_comments.is_empty()
    }
}

/// Comments and spacing attached to a statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trivia {
    /// Full-line comments directly above the statement, `#` included
    pub leading_comments: Vec<String>,
    /// Comment on the same line after the statement
    pub trailing_comment: Option<String>,
    /// Empty lines separating this statement from the previous one
    pub blank_lines_before: u32,
}

/// A statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub trivia: Trivia,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self {
            kind,
            trivia: Trivia::default(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, StatementKind::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Module import: `import os.path as p`, `from math import pi`
    Import(ImportStmt),

    /// Function declaration: `fn add(a: int, b: int) -> int { ... }`
    Function(FunctionDecl),

    /// Assignment: `x = 5`, `x: int = 5`, `total += 1`
    Assign(AssignStmt),

    /// Return statement: `return x`
    Return(Option<Expr>),

    /// `break`
    Break,

    /// `continue`
    Continue,

    /// Conditional: `if a { } elif b { } else { }`
    If {
        branches: Vec<CondBranch>,
        else_branch: Option<Block>,
    },

    /// While loop: `while x < 10 { ... }`
    While { condition: Expr, body: Block },

    /// For loop: `for x in items { ... }`
    For {
        binding: String,
        binding_span: Span,
        iterable: Expr,
        body: Block,
    },

    /// Expression statement: `print(x)`
    Expr(Expr),

    /// Placeholder for a statement that failed to parse
    Error,
}

/// One `if`/`elif` arm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondBranch {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// Assignment statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: Expr,
    /// Compound operator for `+=` and friends
    pub op: Option<BinaryOp>,
    pub annotation: Option<TypeExpr>,
    pub value: Expr,
    /// Filled in by type checking; never printed
    pub inferred: Option<TypeExpr>,
}

/// Import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStmt {
    /// `import a.b.c` or `import a.b.c as c`
    Module {
        path: Vec<String>,
        alias: Option<String>,
    },
    /// `from a.b import x, y`
    From { path: Vec<String>, names: Vec<String> },
}

impl ImportStmt {
    pub fn path(&self) -> &[String] {
        match self {
            ImportStmt::Module { path, .. } | ImportStmt::From { path, .. } => path,
        }
    }

    /// Names this import introduces into module scope
    pub fn bound_names(&self) -> Vec<String> {
        match self {
            ImportStmt::Module { path, alias } => alias
                .clone()
                .or_else(|| path.first().cloned())
                .into_iter()
                .collect(),
            ImportStmt::From { names, .. } => names.clone(),
        }
    }
}

/// Function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeExpr>,
    pub body: Block,
    pub name_span: Span,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}
