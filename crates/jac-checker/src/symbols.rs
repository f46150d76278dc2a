//! Symbol table for name resolution and type checking

use std::collections::HashMap;

use jac_ast::Span;

use crate::{builtins, Type};

/// Index of a symbol in its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// A symbol definition
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    /// The type came from an annotation and is fixed
    pub annotated: bool,
    pub span: Span,
    pub used: bool,
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Builtin,
    Function,
    Import,
    Variable,
    Parameter,
}

/// A scope in the symbol table
#[derive(Debug, Default)]
struct Scope {
    symbols: HashMap<String, SymbolId>,
}

/// Scoped symbol table. The outermost scope holds the builtins; the module
/// scope and one scope per function body are pushed on top of it.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// A table whose outermost scope contains the builtin functions
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            scopes: vec![Scope::default()],
        };
        for &name in builtins::NAMES {
            let ty = builtins::signature(name).unwrap_or(Type::Any);
            table.define(name, SymbolKind::Builtin, ty, Span::dummy());
        }
        table
    }

    /// Define a new symbol in the innermost scope, shadowing any previous
    /// symbol of the same name there
    pub fn define(&mut self, name: &str, kind: SymbolKind, ty: Type, span: Span) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            kind,
            ty,
            annotated: false,
            span,
            used: false,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.symbols.insert(name.to_string(), id);
        }
        id
    }

    /// Look up a symbol by name
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        // Search from innermost scope outward
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
            .and_then(|&id| self.get(id))
    }

    /// Look up a symbol in the innermost scope only
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .last()
            .and_then(|scope| scope.symbols.get(name))
            .and_then(|&id| self.get(id))
    }

    /// Get a symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn mark_used(&mut self, id: SymbolId) {
        if let Some(symbol) = self.get_mut(id) {
            symbol.used = true;
        }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Exit the current scope, returning the symbols it defined in
    /// definition order
    pub fn exit_scope(&mut self) -> Vec<SymbolId> {
        let mut ids: Vec<SymbolId> = self
            .scopes
            .pop()
            .map(|scope| scope.symbols.into_values().collect())
            .unwrap_or_default();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Number of scopes above the builtin scope
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Iterate over all symbols, including shadowed ones
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
