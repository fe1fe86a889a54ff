// src/sema/namer.rs
//! The naming pass: builds the scope forest and symbol arena, checks
//! class-hierarchy well-formedness, validates overrides and
//! abstract-class completeness, and locates the program entry point.
//!
//! Duplicate class definitions keep the first occurrence; unknown base
//! classes have their parent link cleared. If the class graph itself is
//! broken (duplicates, missing bases, inheritance cycles), member
//! resolution does not run.

use crate::errors::{Diagnostics, SemanticError};
use crate::frontend::Pos;
use crate::frontend::ast::{
    Block, ClassDef, Expr, ExprKind, FieldDef, Lambda, LambdaBody, LocalVarDef, MethodDef,
    Program, Stmt, StmtKind, VarDef,
};
use crate::sema::resolve::resolve_type_lit;
use crate::sema::scope::{ScopeId, ScopeKind, SymbolTable};
use crate::sema::scope_stack::ScopeStack;
use crate::sema::symbol::{
    ClassSymbol, LambdaSymbol, MethodSymbol, Symbol, SymbolKind, VarSymbol,
};
use crate::sema::types::{ClassTy, FunTy, Ty};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

pub struct Namer {
    ctx: ScopeStack,
    diags: Diagnostics,
}

impl Namer {
    pub fn new(table: SymbolTable) -> Self {
        Self {
            ctx: ScopeStack::new(table),
            diags: Diagnostics::new(),
        }
    }

    pub fn run(mut self, program: &mut Program) -> (SymbolTable, Diagnostics) {
        tracing::debug!(classes = program.classes.len(), "running naming pass");
        program.global_scope = Some(self.ctx.table().global());
        self.resolve_program(program);
        (self.ctx.into_table(), self.diags)
    }

    fn resolve_program(&mut self, program: &mut Program) {
        // Class graph: duplicates keep the first definition.
        let mut classes: BTreeMap<String, usize> = BTreeMap::new();
        for (i, class) in program.classes.iter().enumerate() {
            match classes.get(&class.name) {
                Some(&earlier) => self.diags.issue(
                    class.pos,
                    SemanticError::DeclConflict {
                        name: class.name.clone(),
                        earlier: program.classes[earlier].pos,
                    },
                ),
                None => {
                    classes.insert(class.name.clone(), i);
                }
            }
        }

        // Unknown base classes lose their parent link.
        for &idx in classes.values() {
            let Some(parent) = program.classes[idx].parent.clone() else {
                continue;
            };
            if !classes.contains_key(&parent.name) {
                self.diags.issue(
                    program.classes[idx].pos,
                    SemanticError::ClassNotFound {
                        name: parent.name.clone(),
                    },
                );
                program.classes[idx].parent = None;
            }
        }

        self.check_cycles(&classes, program);
        if self.diags.has_errors() {
            return;
        }

        // Class symbols, parent-first, so each class's type embeds its
        // ancestor chain.
        let names: Vec<String> = classes.keys().cloned().collect();
        for name in &names {
            self.create_class_symbol(name, &classes, program);
        }

        // Member resolution, base classes before subclasses.
        let mut done = FxHashSet::default();
        for name in &names {
            self.resolve_class(classes[name], &classes, program, &mut done);
        }

        self.locate_main(&classes, program);
    }

    /// Timestamp-coloring cycle detection: every walk stamps the chain it
    /// follows with its own time; meeting the current time again closes a
    /// cycle.
    fn check_cycles(&mut self, classes: &BTreeMap<String, usize>, program: &Program) {
        let mut visited: FxHashMap<String, u32> =
            classes.keys().map(|name| (name.clone(), 0)).collect();

        let mut time = 1u32;
        for start in classes.keys() {
            if visited[start] != 0 {
                continue;
            }
            let mut node = start.clone();
            let mut from: Option<Pos> = None;
            loop {
                let stamp = visited[&node];
                if stamp == 0 {
                    visited.insert(node.clone(), time);
                    let def = &program.classes[classes[&node]];
                    match &def.parent {
                        Some(parent) => {
                            from = Some(def.pos);
                            node = parent.name.clone();
                        }
                        None => break,
                    }
                } else if stamp == time {
                    if let Some(pos) = from {
                        self.diags.issue(pos, SemanticError::BadInheritance);
                    }
                    break;
                } else {
                    break;
                }
            }
            time += 1;
        }
    }

    fn create_class_symbol(
        &mut self,
        name: &str,
        classes: &BTreeMap<String, usize>,
        program: &mut Program,
    ) {
        if self.ctx.table().find_in(SymbolTable::GLOBAL, name).is_some() {
            return;
        }
        let Some(&idx) = classes.get(name) else {
            return;
        };

        let parent = program.classes[idx].parent.clone();
        let (parent_sym, parent_ty, parent_scope) = match parent {
            Some(p) => {
                self.create_class_symbol(&p.name, classes, program);
                match self.ctx.lookup_class(&p.name) {
                    Some(ps) => {
                        let base = self.ctx.table().symbol(ps);
                        match base.as_class() {
                            Some(c) => (Some(ps), Some(c.ty.clone()), Some(c.scope)),
                            None => (None, None, None),
                        }
                    }
                    None => (None, None, None),
                }
            }
            None => (None, None, None),
        };

        let def = &program.classes[idx];
        let ty = ClassTy::new(def.name.clone(), parent_ty);
        let scope = self.ctx.table_mut().new_scope(ScopeKind::Class, parent_scope);
        let sym = self.ctx.table_mut().new_symbol(Symbol {
            name: def.name.clone(),
            pos: def.pos,
            defined_in: None,
            kind: SymbolKind::Class(ClassSymbol {
                ty,
                scope,
                parent: parent_sym,
                is_abstract: def.is_abstract,
                is_main: false,
            }),
        });
        self.ctx.table_mut().scope_mut(scope).owner = Some(sym);
        self.ctx.table_mut().declare_in(SymbolTable::GLOBAL, sym);
        program.classes[idx].symbol = Some(sym);
    }

    fn resolve_class(
        &mut self,
        idx: usize,
        classes: &BTreeMap<String, usize>,
        program: &mut Program,
        done: &mut FxHashSet<String>,
    ) {
        let name = program.classes[idx].name.clone();
        if done.contains(&name) {
            return;
        }

        if let Some(parent) = program.classes[idx].parent.clone() {
            if let Some(&pidx) = classes.get(&parent.name) {
                self.resolve_class(pidx, classes, program, done);
            }
        }

        let Some(class_sym) = program.classes[idx].symbol else {
            return;
        };
        let Some(scope) = self.ctx.table().symbol(class_sym).as_class().map(|c| c.scope) else {
            return;
        };

        self.ctx.open(scope);
        for f in 0..program.classes[idx].fields.len() {
            match &mut program.classes[idx].fields[f] {
                FieldDef::Var(var) => self.visit_field_var(var),
                FieldDef::Method(method) => self.visit_method(method),
            }
        }
        self.check_abstract_completeness(&program.classes[idx], scope);
        self.ctx.close();

        done.insert(name);
    }

    fn check_abstract_completeness(&mut self, def: &ClassDef, scope: ScopeId) {
        if def.is_abstract {
            return;
        }

        let parent = def
            .symbol
            .and_then(|sym| self.ctx.table().symbol(sym).as_class())
            .and_then(|c| c.parent);
        if let Some(parent) = parent {
            for method in self.ctx.table().abstract_methods(parent) {
                if self.ctx.table().find_in(scope, &method).is_none() {
                    self.diags.issue(
                        def.pos,
                        SemanticError::BadAbstractMethod {
                            name: def.name.clone(),
                        },
                    );
                    return;
                }
            }
        }

        // A concrete class may not declare abstract methods of its own.
        let own_abstract = self
            .ctx
            .table()
            .scope(scope)
            .symbols()
            .any(|(_, sym)| {
                matches!(&self.ctx.table().symbol(sym).kind,
                         SymbolKind::Method(m) if m.is_abstract)
            });
        if own_abstract {
            self.diags.issue(
                def.pos,
                SemanticError::BadAbstractMethod {
                    name: def.name.clone(),
                },
            );
        }
    }

    fn locate_main(&mut self, classes: &BTreeMap<String, usize>, program: &mut Program) {
        let mut found = false;
        for &idx in classes.values() {
            let def = &program.classes[idx];
            if def.name != "Main" || def.is_abstract {
                continue;
            }
            let Some(class_sym) = def.symbol else {
                continue;
            };
            let Some(scope) = self.ctx.table().symbol(class_sym).as_class().map(|c| c.scope)
            else {
                continue;
            };
            let Some(main_sym) = self.ctx.table().find_in(scope, "main") else {
                continue;
            };
            let is_entry = match self.ctx.table().symbol(main_sym).as_method() {
                Some(m) => m.is_static && m.ty.ret.is_void() && m.ty.arity() == 0,
                None => false,
            };
            if is_entry {
                if let SymbolKind::Method(m) = &mut self.ctx.table_mut().symbol_mut(main_sym).kind
                {
                    m.is_main = true;
                }
                if let SymbolKind::Class(c) = &mut self.ctx.table_mut().symbol_mut(class_sym).kind
                {
                    c.is_main = true;
                }
                program.main_class = Some(class_sym);
                found = true;
            }
        }
        if !found {
            self.diags.issue_global(SemanticError::NoMainClass);
        }
    }

    // -----------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------

    fn visit_field_var(&mut self, var: &mut VarDef) {
        let ty = resolve_type_lit(&mut var.type_lit, &self.ctx, &mut self.diags);
        if let Some(earlier_id) = self.ctx.find_conflict(&var.id.name) {
            let earlier = self.ctx.table().symbol(earlier_id);
            if earlier.is_var() && earlier.defined_in != Some(self.ctx.current_scope()) {
                self.diags.issue(
                    var.pos,
                    SemanticError::OverridingVar {
                        name: var.id.name.clone(),
                    },
                );
            } else {
                self.diags.issue(
                    var.pos,
                    SemanticError::DeclConflict {
                        name: var.id.name.clone(),
                        earlier: earlier.pos,
                    },
                );
            }
            return;
        }
        if ty.is_void() {
            self.diags.issue(
                var.pos,
                SemanticError::BadVarType {
                    name: var.id.name.clone(),
                },
            );
            return;
        }
        if ty.no_error() {
            let sym = self.ctx.table_mut().new_symbol(Symbol {
                name: var.id.name.clone(),
                pos: var.pos,
                defined_in: None,
                kind: SymbolKind::Var(VarSymbol { ty }),
            });
            self.ctx.declare(sym);
            var.symbol = Some(sym);
        }
    }

    fn visit_method(&mut self, method: &mut MethodDef) {
        if let Some(earlier_id) = self.ctx.find_conflict(&method.id.name) {
            let earlier = self.ctx.table().symbol(earlier_id);
            let earlier_pos = earlier.pos;
            if let SymbolKind::Method(suspect) = &earlier.kind {
                let suspect = suspect.clone();
                // An abstract method may not override a concrete one.
                if !suspect.is_abstract && method.is_abstract {
                    self.diags.issue(
                        method.pos,
                        SemanticError::DeclConflict {
                            name: method.id.name.clone(),
                            earlier: earlier_pos,
                        },
                    );
                    return;
                }
                let inherited = earlier.defined_in != Some(self.ctx.current_scope());
                if inherited && !suspect.is_static && !method.is_static {
                    // Only non-static methods can be overridden, and the
                    // signature must be a subtype of the inherited one.
                    let formal = self.new_formal_scope();
                    let ty = self.type_method(method, formal);
                    if Ty::Fun(Box::new(ty.clone())).subtype_of(&Ty::Fun(Box::new(suspect.ty.clone()))) {
                        self.declare_method(method, formal, ty);
                    } else {
                        let parent = self.ctx.table().symbol(suspect.owner).name.clone();
                        self.diags.issue(
                            method.pos,
                            SemanticError::BadOverride {
                                name: method.id.name.clone(),
                                parent,
                            },
                        );
                    }
                    return;
                }
            }
            self.diags.issue(
                method.pos,
                SemanticError::DeclConflict {
                    name: method.id.name.clone(),
                    earlier: earlier_pos,
                },
            );
            return;
        }

        let formal = self.new_formal_scope();
        let ty = self.type_method(method, formal);
        self.declare_method(method, formal, ty);
    }

    fn new_formal_scope(&mut self) -> ScopeId {
        let parent = self.ctx.current_scope();
        self.ctx
            .table_mut()
            .new_scope(ScopeKind::Formal, Some(parent))
    }

    /// Sign the method: resolve the return and parameter types under its
    /// formal scope, declaring `this` first unless static.
    fn type_method(&mut self, method: &mut MethodDef, formal: ScopeId) -> FunTy {
        let ret = resolve_type_lit(&mut method.return_type, &self.ctx, &mut self.diags);
        self.ctx.open(formal);
        if !method.is_static {
            if let Some(class_ty) = self
                .ctx
                .current_class()
                .and_then(|c| self.ctx.table().symbol(c).as_class().map(|c| c.ty.clone()))
            {
                let this = self.ctx.table_mut().new_symbol(Symbol {
                    name: "this".into(),
                    pos: method.id.pos,
                    defined_in: None,
                    kind: SymbolKind::Var(VarSymbol {
                        ty: Ty::Class(class_ty),
                    }),
                });
                self.ctx.declare(this);
            }
        }
        let mut params = Vec::with_capacity(method.params.len());
        for param in &mut method.params {
            params.push(self.visit_param(param));
        }
        self.ctx.close();
        FunTy::new(ret, params)
    }

    fn declare_method(&mut self, method: &mut MethodDef, formal: ScopeId, ty: FunTy) {
        let Some(owner) = self.ctx.current_class() else {
            return;
        };
        let sym = self.ctx.table_mut().new_symbol(Symbol {
            name: method.id.name.clone(),
            pos: method.pos,
            defined_in: None,
            kind: SymbolKind::Method(MethodSymbol {
                ty,
                formal,
                is_static: method.is_static,
                is_abstract: method.is_abstract,
                owner,
                is_main: false,
            }),
        });
        self.ctx.table_mut().scope_mut(formal).owner = Some(sym);
        self.ctx.declare(sym);
        method.symbol = Some(sym);

        self.ctx.open(formal);
        if let Some(body) = &mut method.body {
            self.visit_block(body);
        }
        self.ctx.close();
    }

    /// Declare one parameter of a method or lambda; returns its type for
    /// the signature even when the declaration itself is rejected.
    fn visit_param(&mut self, param: &mut VarDef) -> Ty {
        let ty = resolve_type_lit(&mut param.type_lit, &self.ctx, &mut self.diags);
        if let Some(earlier_id) = self.ctx.find_conflict(&param.id.name) {
            let earlier_pos = self.ctx.table().symbol(earlier_id).pos;
            self.diags.issue(
                param.pos,
                SemanticError::DeclConflict {
                    name: param.id.name.clone(),
                    earlier: earlier_pos,
                },
            );
            return ty;
        }
        if ty.is_void() {
            self.diags.issue(param.pos, SemanticError::VoidAsPara);
            return ty;
        }
        if ty.no_error() {
            let sym = self.ctx.table_mut().new_symbol(Symbol {
                name: param.id.name.clone(),
                pos: param.id.pos,
                defined_in: None,
                kind: SymbolKind::Var(VarSymbol { ty: ty.clone() }),
            });
            self.ctx.declare(sym);
            param.symbol = Some(sym);
        }
        ty
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn visit_block(&mut self, block: &mut Block) {
        let parent = self.ctx.current_scope();
        let scope = self.ctx.table_mut().new_scope(ScopeKind::Local, Some(parent));
        block.scope = Some(scope);
        self.ctx.open(scope);
        for stmt in &mut block.stmts {
            self.visit_stmt(stmt);
        }
        self.ctx.close();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        let pos = stmt.pos;
        match &mut stmt.kind {
            StmtKind::Block(block) => self.visit_block(block),
            StmtKind::LocalVarDef(def) => self.visit_local_var_def(def, pos),
            StmtKind::Assign(assign) => {
                self.visit_expr(&mut assign.lhs);
                self.visit_expr(&mut assign.rhs);
            }
            StmtKind::ExprEval(expr) => self.visit_expr(expr),
            StmtKind::Skip | StmtKind::Break => {}
            StmtKind::If(if_stmt) => {
                self.visit_expr(&mut if_stmt.cond);
                self.visit_stmt(&mut if_stmt.then_branch);
                if let Some(else_branch) = &mut if_stmt.else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            StmtKind::While(while_stmt) => {
                self.visit_expr(&mut while_stmt.cond);
                self.visit_stmt(&mut while_stmt.body);
            }
            StmtKind::For(for_stmt) => {
                let parent = self.ctx.current_scope();
                let scope = self.ctx.table_mut().new_scope(ScopeKind::Local, Some(parent));
                for_stmt.scope = Some(scope);
                self.ctx.open(scope);
                self.visit_stmt(&mut for_stmt.init);
                self.visit_expr(&mut for_stmt.cond);
                self.visit_stmt(&mut for_stmt.update);
                for stmt in &mut for_stmt.body.stmts {
                    self.visit_stmt(stmt);
                }
                self.ctx.close();
            }
            StmtKind::Return(ret) => {
                if let Some(expr) = &mut ret.expr {
                    self.visit_expr(expr);
                }
            }
            StmtKind::Print(exprs) => {
                for expr in exprs {
                    self.visit_expr(expr);
                }
            }
        }
    }

    fn visit_local_var_def(&mut self, def: &mut LocalVarDef, pos: Pos) {
        if let Some(lit) = &mut def.type_lit {
            resolve_type_lit(lit, &self.ctx, &mut self.diags);
        }

        // A name may not be redeclared while its own initializer is
        // being elaborated.
        if let Some(def_pos) = self.ctx.defining_pos(&def.id.name) {
            self.diags.issue(
                pos,
                SemanticError::DeclConflict {
                    name: def.id.name.clone(),
                    earlier: def_pos,
                },
            );
        }

        let lambda_init = matches!(
            def.init.as_ref().map(|e| &e.kind),
            Some(ExprKind::Lambda(_))
        );
        if lambda_init {
            self.ctx.add_defining(def.id.name.clone(), pos);
        }
        if let Some(init) = &mut def.init {
            self.visit_expr(init);
        }
        if lambda_init {
            self.ctx.remove_defining(&def.id.name);
        }

        if let Some(earlier_id) = self.ctx.find_conflict(&def.id.name) {
            let earlier_pos = self.ctx.table().symbol(earlier_id).pos;
            self.diags.issue(
                pos,
                SemanticError::DeclConflict {
                    name: def.id.name.clone(),
                    earlier: earlier_pos,
                },
            );
            return;
        }

        match &def.type_lit {
            Some(lit) => {
                let ty = lit.ty.clone().unwrap_or(Ty::Error);
                if ty.is_void() {
                    self.diags.issue(
                        pos,
                        SemanticError::BadVarType {
                            name: def.id.name.clone(),
                        },
                    );
                    return;
                }
                if ty.no_error() {
                    self.declare_local(def, ty);
                }
            }
            None => {
                // `var`: the initializer's type is filled in by typing.
                self.declare_local(def, Ty::Null);
            }
        }
    }

    fn declare_local(&mut self, def: &mut LocalVarDef, ty: Ty) {
        let sym = self.ctx.table_mut().new_symbol(Symbol {
            name: def.id.name.clone(),
            pos: def.id.pos,
            defined_in: None,
            kind: SymbolKind::Var(VarSymbol { ty }),
        });
        self.ctx.declare(sym);
        def.symbol = Some(sym);
    }

    // -----------------------------------------------------------------
    // Expressions: only lambdas introduce structure during naming.
    // -----------------------------------------------------------------

    fn visit_expr(&mut self, expr: &mut Expr) {
        let pos = expr.pos;
        match &mut expr.kind {
            ExprKind::IntLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::StringLit(_)
            | ExprKind::NullLit
            | ExprKind::ReadInt
            | ExprKind::ReadLine
            | ExprKind::This
            | ExprKind::NewClass(_) => {}
            ExprKind::Unary(unary) => self.visit_expr(&mut unary.operand),
            ExprKind::Binary(binary) => {
                self.visit_expr(&mut binary.lhs);
                self.visit_expr(&mut binary.rhs);
            }
            ExprKind::NewArray(new_array) => self.visit_expr(&mut new_array.length),
            ExprKind::VarSel(var_sel) => {
                if let Some(receiver) = &mut var_sel.receiver {
                    self.visit_expr(receiver);
                }
            }
            ExprKind::IndexSel(index_sel) => {
                self.visit_expr(&mut index_sel.array);
                self.visit_expr(&mut index_sel.index);
            }
            ExprKind::Call(call) => {
                self.visit_expr(&mut call.callee);
                for arg in &mut call.args {
                    self.visit_expr(arg);
                }
            }
            ExprKind::ClassTest(test) => self.visit_expr(&mut test.obj),
            ExprKind::ClassCast(cast) => self.visit_expr(&mut cast.obj),
            ExprKind::Lambda(lambda) => self.visit_lambda(lambda, pos),
        }
    }

    fn visit_lambda(&mut self, lambda: &mut Lambda, pos: Pos) {
        let parent = self.ctx.current_scope();
        let scope = self.ctx.table_mut().new_scope(ScopeKind::Lambda, Some(parent));
        lambda.scope = Some(scope);
        self.ctx.open(scope);

        let mut params = Vec::with_capacity(lambda.params.len());
        for param in &mut lambda.params {
            params.push(self.visit_param(param));
        }

        let sym = self.ctx.table_mut().new_symbol(Symbol {
            name: format!("lambda@{}", pos),
            pos,
            defined_in: None,
            kind: SymbolKind::Lambda(LambdaSymbol {
                ty: Ty::TFun(Box::new(FunTy::new(Ty::Null, params))),
                scope,
                return_types: Vec::new(),
                captured: Vec::new(),
            }),
        });
        self.ctx.declare(sym);
        self.ctx.table_mut().scope_mut(scope).owner = Some(sym);
        lambda.symbol = Some(sym);

        match &mut lambda.body {
            LambdaBody::Block(block) => self.visit_block(block),
            LambdaBody::Expr { expr, scope: expr_scope } => {
                let parent = self.ctx.current_scope();
                let local = self.ctx.table_mut().new_scope(ScopeKind::Local, Some(parent));
                *expr_scope = Some(local);
                self.ctx.open(local);
                self.visit_expr(expr);
                self.ctx.close();
            }
        }

        self.ctx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Id, TypeLit};

    fn p(line: u32, col: u32) -> Pos {
        Pos::new(line, col)
    }

    fn class(name: &str, parent: Option<&str>, is_abstract: bool, fields: Vec<FieldDef>, pos: Pos) -> ClassDef {
        ClassDef::new(name, parent.map(|n| Id::new(n, pos)), is_abstract, fields, pos)
    }

    fn method(name: &str, is_static: bool, is_abstract: bool, ret: TypeLit, pos: Pos) -> FieldDef {
        FieldDef::Method(MethodDef {
            is_static,
            is_abstract,
            return_type: ret,
            id: Id::new(name, pos),
            params: vec![],
            body: if is_abstract {
                None
            } else {
                Some(Block::new(vec![], pos))
            },
            pos,
            symbol: None,
        })
    }

    fn main_class(pos: Pos) -> ClassDef {
        class(
            "Main",
            None,
            false,
            vec![method("main", true, false, TypeLit::void(pos), pos)],
            pos,
        )
    }

    fn run_namer(program: &mut Program) -> Vec<String> {
        let (_, diags) = Namer::new(SymbolTable::new()).run(program);
        diags
            .into_sorted()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn duplicate_classes_keep_the_first() {
        let mut program = Program::new(vec![
            main_class(p(1, 1)),
            class("A", None, false, vec![], p(2, 1)),
            class("A", None, false, vec![], p(3, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (3,1): declaration of 'A' here conflicts with earlier declaration at (2,1)"]
        );
    }

    #[test]
    fn unknown_base_classes_are_reported_and_cleared() {
        let mut program = Program::new(vec![
            main_class(p(1, 1)),
            class("A", Some("Ghost"), false, vec![], p(2, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (2,1): class 'Ghost' not found"]
        );
        assert!(program.classes[1].parent.is_none());
    }

    #[test]
    fn inheritance_cycles_are_rejected() {
        let mut program = Program::new(vec![
            class("A", Some("B"), false, vec![], p(1, 1)),
            class("B", Some("A"), false, vec![], p(2, 1)),
        ]);
        let errors = run_namer(&mut program);
        assert_eq!(
            errors,
            vec!["*** Error at (2,1): illegal class inheritance (should be acyclic)"]
        );
        // Member resolution did not run, so no entry-point error either.
        assert!(program.classes[0].symbol.is_none());
    }

    #[test]
    fn a_program_needs_a_main_class() {
        let mut program = Program::new(vec![class("A", None, false, vec![], p(1, 1))]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error: no legal Main class named 'Main' was found"]
        );
    }

    #[test]
    fn main_must_be_static_void_and_nullary() {
        let mut program = Program::new(vec![class(
            "Main",
            None,
            false,
            vec![method("main", false, false, TypeLit::void(p(1, 14)), p(1, 14))],
            p(1, 1),
        )]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error: no legal Main class named 'Main' was found"]
        );
    }

    #[test]
    fn concrete_subclasses_must_cover_inherited_abstracts() {
        let mut program = Program::new(vec![
            class(
                "A",
                None,
                true,
                vec![method("f", false, true, TypeLit::void(p(1, 20)), p(1, 20))],
                p(1, 1),
            ),
            class("B", Some("A"), false, vec![], p(2, 1)),
            main_class(p(3, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (2,1): 'B' is not abstract and does not override all abstract methods"]
        );
    }

    #[test]
    fn overriding_abstracts_makes_a_subclass_concrete() {
        let mut program = Program::new(vec![
            class(
                "A",
                None,
                true,
                vec![method("f", false, true, TypeLit::void(p(1, 20)), p(1, 20))],
                p(1, 1),
            ),
            class(
                "B",
                Some("A"),
                false,
                vec![method("f", false, false, TypeLit::void(p(2, 15)), p(2, 15))],
                p(2, 1),
            ),
            main_class(p(3, 1)),
        ]);
        assert!(run_namer(&mut program).is_empty());
    }

    #[test]
    fn concrete_classes_may_not_declare_abstract_methods() {
        let mut program = Program::new(vec![
            class(
                "A",
                None,
                false,
                vec![method("f", false, true, TypeLit::void(p(1, 11)), p(1, 11))],
                p(1, 1),
            ),
            main_class(p(2, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (1,1): 'A' is not abstract and does not override all abstract methods"]
        );
    }

    #[test]
    fn override_with_an_incompatible_signature() {
        let int_method = |pos| {
            FieldDef::Method(MethodDef {
                is_static: false,
                is_abstract: false,
                return_type: TypeLit::int(pos),
                id: Id::new("f", pos),
                params: vec![],
                body: Some(Block::new(vec![], pos)),
                pos,
                symbol: None,
            })
        };
        let mut program = Program::new(vec![
            class(
                "A",
                None,
                false,
                vec![method("f", false, false, TypeLit::void(p(1, 11)), p(1, 11))],
                p(1, 1),
            ),
            class("B", Some("A"), false, vec![int_method(p(2, 15))], p(2, 1)),
            main_class(p(3, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (2,15): overriding method 'f' doesn't match the type signature in class 'A'"]
        );
    }

    #[test]
    fn fields_may_not_shadow_inherited_fields() {
        let mut program = Program::new(vec![
            class(
                "A",
                None,
                false,
                vec![FieldDef::Var(VarDef::new(
                    TypeLit::int(p(1, 11)),
                    Id::new("x", p(1, 15)),
                    p(1, 11),
                ))],
                p(1, 1),
            ),
            class(
                "B",
                Some("A"),
                false,
                vec![FieldDef::Var(VarDef::new(
                    TypeLit::int(p(2, 15)),
                    Id::new("x", p(2, 19)),
                    p(2, 15),
                ))],
                p(2, 1),
            ),
            main_class(p(3, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (2,15): overriding variable is not allowed for var 'x'"]
        );
    }

    #[test]
    fn void_fields_are_rejected() {
        let mut program = Program::new(vec![
            class(
                "A",
                None,
                false,
                vec![FieldDef::Var(VarDef::new(
                    TypeLit::void(p(1, 11)),
                    Id::new("x", p(1, 16)),
                    p(1, 11),
                ))],
                p(1, 1),
            ),
            main_class(p(2, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (1,11): cannot declare identifier 'x' as void type"]
        );
    }

    #[test]
    fn static_methods_do_not_participate_in_overriding() {
        let mut program = Program::new(vec![
            class(
                "A",
                None,
                false,
                vec![method("f", true, false, TypeLit::void(p(1, 11)), p(1, 11))],
                p(1, 1),
            ),
            class(
                "B",
                Some("A"),
                false,
                vec![method("f", false, false, TypeLit::void(p(2, 15)), p(2, 15))],
                p(2, 1),
            ),
            main_class(p(3, 1)),
        ]);
        assert_eq!(
            run_namer(&mut program),
            vec!["*** Error at (2,15): declaration of 'f' here conflicts with earlier declaration at (1,11)"]
        );
    }
}
