// src/sema/scope_stack.rs
//! The live evaluation context shared by both passes.
//!
//! A full stack looks like
//!
//! ```text
//!     LocalScope    <- stack top (current scope)
//!     ...
//!     FormalScope
//!     ClassScope
//!     ...           <- parent class scopes
//!     ClassScope
//!     GlobalScope   <- conceptually at the bottom, never pushed
//! ```
//!
//! The global scope is never pushed; lookups fall through to it. Opening
//! a class scope first opens its whole ancestor chain, and closing a
//! class scope pops the whole chain. Every `open` is paired with exactly
//! one `close` on every exit path.

use crate::frontend::Pos;
use crate::sema::scope::{ScopeId, ScopeKind, SymbolTable};
use crate::sema::symbol::{Capture, SymbolId, SymbolKind};
use rustc_hash::FxHashMap;

pub struct ScopeStack {
    table: SymbolTable,
    stack: Vec<ScopeId>,
    /// Every lambda scope currently open, innermost last.
    lambda_stack: Vec<ScopeId>,
    /// Names whose initializer is currently being elaborated, keyed to
    /// the definition position. Guards self-referential initializers.
    defining: FxHashMap<String, Pos>,
    curr_class: Option<SymbolId>,
    curr_method: Option<SymbolId>,
}

impl ScopeStack {
    pub fn new(table: SymbolTable) -> Self {
        Self {
            table,
            stack: Vec::new(),
            lambda_stack: Vec::new(),
            defining: FxHashMap::default(),
            curr_class: None,
            curr_method: None,
        }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut SymbolTable {
        &mut self.table
    }

    pub fn into_table(self) -> SymbolTable {
        debug_assert!(self.stack.is_empty(), "scope leaked at end of pass");
        self.table
    }

    pub fn current_scope(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(SymbolTable::GLOBAL)
    }

    /// The innermost class currently (or last) open.
    pub fn current_class(&self) -> Option<SymbolId> {
        self.curr_class
    }

    /// The method currently (or last) open.
    pub fn current_method(&self) -> Option<SymbolId> {
        self.curr_method
    }

    /// The innermost open lambda's symbol.
    pub fn current_lambda(&self) -> Option<SymbolId> {
        let scope = *self.lambda_stack.last()?;
        self.table.scope(scope).owner
    }

    pub fn current_lambda_scope(&self) -> Option<ScopeId> {
        self.lambda_stack.last().copied()
    }

    pub fn in_lambda(&self) -> bool {
        !self.lambda_stack.is_empty()
    }

    /// Push a scope. A class scope opens its whole ancestor chain first
    /// and must never be opened above a formal/local/lambda scope.
    pub fn open(&mut self, scope: ScopeId) {
        let kind = self.table.scope(scope).kind;
        match kind {
            ScopeKind::Global => {
                debug_assert!(false, "the global scope is never pushed");
            }
            ScopeKind::Class => {
                debug_assert!(
                    !self
                        .table
                        .scope(self.current_scope())
                        .kind
                        .is_local_like(),
                    "class scope opened above a statement scope"
                );
                if let Some(parent) = self.table.scope(scope).parent {
                    self.open(parent);
                }
                self.curr_class = self.table.scope(scope).owner;
            }
            ScopeKind::Formal => {
                self.curr_method = self.table.scope(scope).owner;
            }
            ScopeKind::Lambda => {
                self.lambda_stack.push(scope);
            }
            ScopeKind::Local => {}
        }
        self.stack.push(scope);
    }

    /// Pop the current scope. Closing a lambda hands its filtered capture
    /// set to the enclosing lambda; closing a class pops the whole chain.
    pub fn close(&mut self) {
        let Some(scope) = self.stack.pop() else {
            debug_assert!(false, "close without matching open");
            return;
        };
        let kind = self.table.scope(scope).kind;
        match kind {
            ScopeKind::Lambda => {
                self.lambda_stack.pop();
                self.propagate_captures(scope);
            }
            ScopeKind::Class => {
                self.stack.clear();
            }
            _ => {}
        }
    }

    /// Merge a closing lambda's captures into the enclosing lambda,
    /// dropping entries defined within the enclosing lambda itself.
    fn propagate_captures(&mut self, closing: ScopeId) {
        let Some(&enclosing) = self.lambda_stack.last() else {
            return;
        };
        let Some(closing_sym) = self.table.scope(closing).owner else {
            return;
        };
        let captured = match &self.table.symbol(closing_sym).kind {
            SymbolKind::Lambda(l) => l.captured.clone(),
            _ => return,
        };
        tracing::trace!(count = captured.len(), "propagating lambda captures");
        for capture in captured {
            match capture {
                Capture::This => self.record_capture_in(enclosing, Capture::This),
                Capture::Var(sym) => {
                    let Some(defined_in) = self.table.symbol(sym).defined_in else {
                        continue;
                    };
                    if self.table.hoist_locals(defined_in) != enclosing {
                        self.record_capture_in(enclosing, Capture::Var(sym));
                    }
                }
            }
        }
    }

    /// Record a capture into the innermost open lambda.
    pub fn record_capture(&mut self, capture: Capture) {
        if let Some(&scope) = self.lambda_stack.last() {
            self.record_capture_in(scope, capture);
        }
    }

    fn record_capture_in(&mut self, lambda_scope: ScopeId, capture: Capture) {
        let Some(owner) = self.table.scope(lambda_scope).owner else {
            return;
        };
        if let SymbolKind::Lambda(l) = &mut self.table.symbol_mut(owner).kind {
            if !l.captured.contains(&capture) {
                l.captured.push(capture);
            }
        }
    }

    /// Declare a symbol in the current scope.
    pub fn declare(&mut self, sym: SymbolId) {
        self.table.declare_in(self.current_scope(), sym);
    }

    /// Innermost-first lookup over the active stack, falling through to
    /// the global scope.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.find_while(name, |_| true, |_| true)
    }

    /// Like `lookup`, but local-scope symbols declared at or after `pos`
    /// are skipped (declaration-before-use within a block).
    pub fn lookup_before(&self, name: &str, pos: Pos) -> Option<SymbolId> {
        self.find_while(
            name,
            |_| true,
            |sym| {
                let local = self
                    .table
                    .symbol(sym)
                    .defined_in
                    .is_some_and(|s| self.table.scope(s).kind == ScopeKind::Local);
                !(local && self.table.symbol(sym).pos >= pos)
            },
        )
    }

    /// Conflict probe for a declaration in the current scope: inside
    /// statement scopes, scan inward while still in statement scopes and
    /// also check the global scope; elsewhere behave like `lookup`.
    /// Override checking is not done here.
    pub fn find_conflict(&self, name: &str) -> Option<SymbolId> {
        if self.table.scope(self.current_scope()).kind.is_local_like() {
            return self
                .find_while(name, |kind| kind.is_local_like(), |_| true)
                .or_else(|| self.table.find_in(SymbolTable::GLOBAL, name));
        }
        self.lookup(name)
    }

    /// Look up a class symbol in the global scope.
    pub fn lookup_class(&self, name: &str) -> Option<SymbolId> {
        self.table
            .find_in(SymbolTable::GLOBAL, name)
            .filter(|&sym| self.table.symbol(sym).is_class())
    }

    pub fn add_defining(&mut self, name: impl Into<String>, pos: Pos) {
        self.defining.insert(name.into(), pos);
    }

    pub fn remove_defining(&mut self, name: &str) {
        self.defining.remove(name);
    }

    pub fn defining_pos(&self, name: &str) -> Option<Pos> {
        self.defining.get(name).copied()
    }

    fn find_while(
        &self,
        name: &str,
        cond: impl Fn(ScopeKind) -> bool,
        valid: impl Fn(SymbolId) -> bool,
    ) -> Option<SymbolId> {
        for &scope in self.stack.iter().rev() {
            if !cond(self.table.scope(scope).kind) {
                return None;
            }
            if let Some(sym) = self.table.find_in(scope, name) {
                if valid(sym) {
                    return Some(sym);
                }
            }
        }
        if cond(ScopeKind::Global) {
            return self.table.find_in(SymbolTable::GLOBAL, name);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Pos;
    use crate::sema::symbol::{Symbol, VarSymbol};
    use crate::sema::types::Ty;

    fn var(name: &str, pos: Pos) -> Symbol {
        Symbol {
            name: name.into(),
            pos,
            defined_in: None,
            kind: SymbolKind::Var(VarSymbol { ty: Ty::Int }),
        }
    }

    #[test]
    fn lookup_falls_through_to_the_global_scope() {
        let mut table = SymbolTable::new();
        let global_var = table.new_symbol(var("g", Pos::new(1, 1)));
        table.declare_in(SymbolTable::GLOBAL, global_var);
        let local = table.new_scope(ScopeKind::Local, Some(SymbolTable::GLOBAL));

        let mut ctx = ScopeStack::new(table);
        ctx.open(local);
        assert_eq!(ctx.lookup("g"), Some(global_var));
        ctx.close();
    }

    #[test]
    fn lookup_before_skips_later_locals_but_sees_outer_ones() {
        let mut table = SymbolTable::new();
        let outer = table.new_scope(ScopeKind::Local, Some(SymbolTable::GLOBAL));
        let inner = table.new_scope(ScopeKind::Local, Some(outer));
        let outer_x = table.new_symbol(var("x", Pos::new(1, 1)));
        table.declare_in(outer, outer_x);
        let inner_x = table.new_symbol(var("x", Pos::new(3, 5)));
        table.declare_in(inner, inner_x);

        let mut ctx = ScopeStack::new(table);
        ctx.open(outer);
        ctx.open(inner);
        // Before the inner declaration, the outer binding is visible.
        assert_eq!(ctx.lookup_before("x", Pos::new(3, 5)), Some(outer_x));
        // After it, the inner one shadows.
        assert_eq!(ctx.lookup_before("x", Pos::new(4, 1)), Some(inner_x));
        ctx.close();
        ctx.close();
    }

    #[test]
    fn find_conflict_stops_at_class_scopes_but_checks_global() {
        let mut table = SymbolTable::new();
        let class_scope = table.new_scope(ScopeKind::Class, None);
        let field = table.new_symbol(var("x", Pos::new(1, 1)));
        table.declare_in(class_scope, field);
        let clazz = table.new_symbol(var("C", Pos::new(1, 1)));
        table.declare_in(SymbolTable::GLOBAL, clazz);
        let formal = table.new_scope(ScopeKind::Formal, Some(class_scope));

        let mut ctx = ScopeStack::new(table);
        ctx.open(class_scope);
        ctx.open(formal);
        // A parameter may shadow a field.
        assert_eq!(ctx.find_conflict("x"), None);
        // But not a global name.
        assert_eq!(ctx.find_conflict("C"), Some(clazz));
        ctx.close();
        ctx.close();
    }
}
