// src/sema/scope.rs
//! Scopes and the arena that owns them.
//!
//! Scopes and symbols cross-reference each other only through arena ids,
//! so the inheritance graph needs no heap cycles: a class scope points at
//! its base-class scope by id, and member lookup walks that chain.

use crate::sema::symbol::{Symbol, SymbolId, SymbolKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Index of a scope in the `SymbolTable` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    Global,
    Class,
    Formal,
    Local,
    Lambda,
}

impl ScopeKind {
    /// Scopes that hold statement-level bindings; conflict checking stops
    /// at the first scope outside this set.
    pub fn is_local_like(self) -> bool {
        matches!(self, ScopeKind::Formal | ScopeKind::Local | ScopeKind::Lambda)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Static lexical parent: the base-class scope for class scopes, the
    /// enclosing scope for formal/local/lambda scopes.
    pub parent: Option<ScopeId>,
    /// Owning symbol: the class, method, or lambda this scope belongs to.
    pub owner: Option<SymbolId>,
    /// Declared names, pairwise distinct within one scope.
    symbols: BTreeMap<String, SymbolId>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            owner: None,
            symbols: BTreeMap::new(),
        }
    }

    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.symbols.iter().map(|(n, &s)| (n.as_str(), s))
    }
}

/// The arena owning every scope and symbol of one analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new() -> Self {
        let mut table = Self {
            scopes: Vec::new(),
            symbols: Vec::new(),
        };
        table.scopes.push(Scope::new(ScopeKind::Global, None));
        table
    }

    pub fn global(&self) -> ScopeId {
        Self::GLOBAL
    }

    pub fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, parent));
        id
    }

    pub fn new_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, s)| (ScopeId(i as u32), s))
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    pub fn find_in(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).find(name)
    }

    /// Declare a symbol in a scope. Names within one scope are unique;
    /// callers run conflict checks first.
    pub fn declare_in(&mut self, scope: ScopeId, sym: SymbolId) {
        let name = self.symbols[sym.0 as usize].name.clone();
        debug_assert!(
            !self.scope(scope).contains(&name),
            "redeclaration of '{name}' in one scope"
        );
        self.symbols[sym.0 as usize].defined_in = Some(scope);
        self.scope_mut(scope).symbols.insert(name, sym);
    }

    /// Member lookup: search a class scope and then its base-class chain.
    pub fn lookup_in_class(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(sym) = self.find_in(id, name) {
                return Some(sym);
            }
            current = self.scope(id).parent;
        }
        None
    }

    /// Hoist a scope through enclosing local scopes to the nearest
    /// non-local scope (itself, when it is not local).
    pub fn hoist_locals(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        while self.scope(current).kind == ScopeKind::Local {
            match self.scope(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Whether a symbol is a class member variable.
    pub fn is_member_var(&self, sym: SymbolId) -> bool {
        let symbol = self.symbol(sym);
        symbol.is_var()
            && symbol
                .defined_in
                .is_some_and(|s| self.scope(s).kind == ScopeKind::Class)
    }

    /// The class symbol owning a member symbol's scope, if any.
    pub fn owner_class_of(&self, sym: SymbolId) -> Option<SymbolId> {
        let scope = self.symbol(sym).defined_in?;
        if self.scope(scope).kind != ScopeKind::Class {
            return None;
        }
        self.scope(scope).owner
    }

    /// Abstract method names a class exposes: inherited ones minus
    /// concrete overrides, plus its own abstract declarations.
    pub fn abstract_methods(&self, class: SymbolId) -> BTreeSet<String> {
        let Some(cs) = self.symbol(class).as_class() else {
            return BTreeSet::new();
        };
        let mut set = match cs.parent {
            Some(parent) => self.abstract_methods(parent),
            None => BTreeSet::new(),
        };
        for (name, sym) in self.scope(cs.scope).symbols() {
            if let SymbolKind::Method(m) = &self.symbol(sym).kind {
                if m.is_abstract {
                    set.insert(name.to_string());
                } else {
                    set.remove(name);
                }
            }
        }
        set
    }
}
