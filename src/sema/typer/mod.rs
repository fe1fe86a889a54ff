// src/sema/typer/mod.rs
//! The typing pass: resolves every expression's type, checks statements,
//! infers lambda result types, and tracks lambda captures.
//!
//! Runs only when naming reported no errors, so symbol annotations are
//! present on every declaration it visits. Every expression node ends
//! the pass with a type, `error` included.

mod call;
mod expr;
mod lambda;


use crate::errors::{Diagnostics, SemanticError};
use crate::frontend::Pos;
use crate::frontend::ast::{
    Assign, Block, ClassDef, Expr, ExprKind, FieldDef, LocalVarDef, MethodDef, Program,
    ReturnStmt, Stmt, StmtKind,
};
use crate::sema::scope::{ScopeKind, SymbolTable};
use crate::sema::scope_stack::ScopeStack;
use crate::sema::symbol::SymbolKind;
use crate::sema::types::{ClassTy, Ty};

static ERROR: Ty = Ty::Error;

/// The type assigned to an expression, `error` if it has none yet.
fn ty_of(expr: &Expr) -> &Ty {
    expr.ty.as_ref().unwrap_or(&ERROR)
}

pub struct Typer {
    ctx: ScopeStack,
    diags: Diagnostics,
    /// Loop nesting depth; `break` outside any loop is an error.
    loop_level: u32,
    /// Definition position of the local whose initializer is being
    /// checked. Bare-name lookups are restricted to symbols declared
    /// before it, which is what rejects `var x = x;`.
    local_var_def_pos: Option<Pos>,
}

impl Typer {
    pub fn new(table: SymbolTable) -> Self {
        Self {
            ctx: ScopeStack::new(table),
            diags: Diagnostics::new(),
            loop_level: 0,
            local_var_def_pos: None,
        }
    }

    pub fn run(mut self, program: &mut Program) -> (SymbolTable, Diagnostics) {
        tracing::debug!(classes = program.classes.len(), "running typing pass");
        for class in &mut program.classes {
            self.visit_class(class);
        }
        (self.ctx.into_table(), self.diags)
    }

    fn visit_class(&mut self, class: &mut ClassDef) {
        let Some(scope) = class
            .symbol
            .and_then(|sym| self.ctx.table().symbol(sym).as_class().map(|c| c.scope))
        else {
            return;
        };
        self.ctx.open(scope);
        for field in &mut class.fields {
            if let FieldDef::Method(method) = field {
                self.visit_method(method);
            }
        }
        self.ctx.close();
    }

    fn visit_method(&mut self, method: &mut MethodDef) {
        let Some((formal, ret_is_void)) = method.symbol.and_then(|sym| {
            self.ctx
                .table()
                .symbol(sym)
                .as_method()
                .map(|m| (m.formal, m.ty.ret.is_void()))
        }) else {
            return;
        };
        self.ctx.open(formal);
        if let Some(body) = &mut method.body {
            self.visit_block(body);
            if !ret_is_void && !body.returns {
                self.diags.issue(body.pos, SemanticError::MissingReturn);
            }
        }
        self.ctx.close();
    }

    fn visit_block(&mut self, block: &mut Block) {
        let Some(scope) = block.scope else {
            return;
        };
        self.ctx.open(scope);
        for stmt in &mut block.stmts {
            self.visit_stmt(stmt);
        }
        // A block returns iff its last statement does.
        block.returns = block.stmts.last().is_some_and(|s| s.returns);
        self.ctx.close();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        let pos = stmt.pos;
        stmt.returns = match &mut stmt.kind {
            StmtKind::Block(block) => {
                self.visit_block(block);
                block.returns
            }
            StmtKind::LocalVarDef(def) => {
                self.visit_local_var_def(def, pos);
                false
            }
            StmtKind::Assign(assign) => {
                self.visit_assign(assign, pos);
                false
            }
            StmtKind::ExprEval(expr) => {
                self.visit_expr(expr);
                false
            }
            StmtKind::Skip => false,
            StmtKind::If(if_stmt) => {
                self.check_test_expr(&mut if_stmt.cond);
                self.visit_stmt(&mut if_stmt.then_branch);
                if let Some(else_branch) = &mut if_stmt.else_branch {
                    self.visit_stmt(else_branch);
                }
                // An if returns iff both branches return.
                if_stmt.then_branch.returns
                    && if_stmt.else_branch.as_ref().is_some_and(|e| e.returns)
            }
            StmtKind::While(while_stmt) => {
                self.check_test_expr(&mut while_stmt.cond);
                self.loop_level += 1;
                self.visit_stmt(&mut while_stmt.body);
                self.loop_level -= 1;
                false
            }
            StmtKind::For(for_stmt) => {
                if let Some(scope) = for_stmt.scope {
                    self.ctx.open(scope);
                    self.visit_stmt(&mut for_stmt.init);
                    self.check_test_expr(&mut for_stmt.cond);
                    self.visit_stmt(&mut for_stmt.update);
                    self.loop_level += 1;
                    for stmt in &mut for_stmt.body.stmts {
                        self.visit_stmt(stmt);
                    }
                    self.loop_level -= 1;
                    self.ctx.close();
                }
                false
            }
            StmtKind::Break => {
                if self.loop_level == 0 {
                    self.diags.issue(pos, SemanticError::BreakOutOfLoop);
                }
                false
            }
            StmtKind::Return(ret) => self.visit_return(ret, pos),
            StmtKind::Print(exprs) => {
                for (i, expr) in exprs.iter_mut().enumerate() {
                    self.visit_expr(expr);
                    let ty = ty_of(expr);
                    if ty.no_error() && !ty.is_base() {
                        self.diags.issue(
                            expr.pos,
                            SemanticError::BadPrintArg {
                                index: i + 1,
                                ty: ty.to_string(),
                            },
                        );
                    }
                }
                false
            }
        };
    }

    fn visit_return(&mut self, ret: &mut ReturnStmt, pos: Pos) -> bool {
        if self.ctx.in_lambda() {
            // Inside a lambda, return types are collected; checking is
            // deferred to lambda finalization.
            let (actual, returns) = match &mut ret.expr {
                Some(expr) => {
                    self.visit_expr(expr);
                    (ty_of(expr).clone(), true)
                }
                None => (Ty::Void, false),
            };
            ret.return_type = Some(actual.clone());
            if let Some(lambda) = self.ctx.current_lambda() {
                if let SymbolKind::Lambda(l) = &mut self.ctx.table_mut().symbol_mut(lambda).kind {
                    l.return_types.push(actual);
                }
            }
            returns
        } else {
            let expected = self
                .ctx
                .current_method()
                .and_then(|m| {
                    self.ctx
                        .table()
                        .symbol(m)
                        .as_method()
                        .map(|m| (*m.ty.ret).clone())
                })
                .unwrap_or(Ty::Error);
            if let Some(expr) = &mut ret.expr {
                self.visit_expr(expr);
            }
            let actual = ret
                .expr
                .as_ref()
                .map(|e| ty_of(e).clone())
                .unwrap_or(Ty::Void);
            if actual.no_error() && !actual.subtype_of(&expected) {
                self.diags.issue(
                    pos,
                    SemanticError::BadReturnType {
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    },
                );
            }
            ret.return_type = Some(actual);
            ret.expr.is_some()
        }
    }

    fn visit_assign(&mut self, assign: &mut Assign, pos: Pos) {
        self.visit_expr(&mut assign.lhs);
        self.visit_expr(&mut assign.rhs);
        let lt = ty_of(&assign.lhs).clone();
        let rt = ty_of(&assign.rhs).clone();

        if self.ctx.in_lambda() {
            // Only the capture rule applies inside a lambda body: a bare
            // name defined outside the lambda may not be assigned.
            // Class members are reached through the captured `this` and
            // are exempt.
            if let ExprKind::VarSel(v) = &assign.lhs.kind {
                if v.receiver.is_none() {
                    if let Some(sym) = v.symbol {
                        let table = self.ctx.table();
                        if let Some(defined_in) = table.symbol(sym).defined_in {
                            let hoisted = table.hoist_locals(defined_in);
                            let is_member = table.scope(hoisted).kind == ScopeKind::Class;
                            let inside = self.ctx.current_lambda_scope() == Some(hoisted);
                            if !is_member && !inside {
                                self.diags.issue(pos, SemanticError::AssignCapture);
                            }
                        }
                    }
                }
            }
            return;
        }

        if let ExprKind::VarSel(v) = &assign.lhs.kind {
            if v.is_method {
                self.diags.issue(
                    pos,
                    SemanticError::AssignMethod {
                        name: v.name.clone(),
                    },
                );
            }
        }
        if lt.no_error() && !rt.subtype_of(&lt) {
            self.diags.issue(
                pos,
                SemanticError::IncompatBinOp {
                    lhs: lt.to_string(),
                    op: "=".into(),
                    rhs: rt.to_string(),
                },
            );
        }
    }

    fn visit_local_var_def(&mut self, def: &mut LocalVarDef, pos: Pos) {
        let Some(init) = &mut def.init else {
            return;
        };
        self.local_var_def_pos = Some(def.id.pos);
        self.visit_expr(init);
        self.local_var_def_pos = None;
        let init_ty = ty_of(init).clone();

        match &def.type_lit {
            Some(_) => {
                let Some(sym) = def.symbol else {
                    return;
                };
                let lt = self.ctx.table().symbol(sym).ty();
                if lt.no_error() && !init_ty.subtype_of(&lt) {
                    self.diags.issue(
                        def.assign_pos.unwrap_or(pos),
                        SemanticError::IncompatBinOp {
                            lhs: lt.to_string(),
                            op: "=".into(),
                            rhs: init_ty.to_string(),
                        },
                    );
                }
            }
            None => {
                // `var`: the symbol takes the initializer's type.
                if init_ty.is_void() {
                    self.diags.issue(
                        def.id.pos,
                        SemanticError::AssignVarVoid {
                            name: def.id.name.clone(),
                        },
                    );
                }
                if let Some(sym) = def.symbol {
                    if let SymbolKind::Var(v) = &mut self.ctx.table_mut().symbol_mut(sym).kind {
                        v.ty = init_ty;
                    }
                }
            }
        }
    }

    fn check_test_expr(&mut self, expr: &mut Expr) {
        self.visit_expr(expr);
        let ty = ty_of(expr);
        if ty.no_error() && *ty != Ty::Bool {
            self.diags.issue(expr.pos, SemanticError::BadTestExpr);
        }
    }

    fn current_method_is_static(&self) -> bool {
        self.ctx
            .current_method()
            .and_then(|m| self.ctx.table().symbol(m).as_method().map(|m| m.is_static))
            .unwrap_or(false)
    }

    fn current_method_name(&self) -> String {
        self.ctx
            .current_method()
            .map(|m| self.ctx.table().symbol(m).name.clone())
            .unwrap_or_default()
    }

    fn current_class_ty(&self) -> Option<ClassTy> {
        self.ctx
            .current_class()
            .and_then(|c| self.ctx.table().symbol(c).as_class().map(|c| c.ty.clone()))
    }
}
