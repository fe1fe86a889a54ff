// src/sema/typer/expr.rs

use super::*;
use crate::frontend::ast::{BinaryOp, NewClass, UnaryOp, VarSel};
use crate::sema::resolve::resolve_type_lit;
use crate::sema::symbol::Capture;

impl Typer {
    pub(super) fn visit_expr(&mut self, expr: &mut Expr) {
        let pos = expr.pos;
        let ty = match &mut expr.kind {
            ExprKind::IntLit(_) => Ty::Int,
            ExprKind::BoolLit(_) => Ty::Bool,
            ExprKind::StringLit(_) => Ty::String,
            ExprKind::NullLit => Ty::Null,
            ExprKind::ReadInt => Ty::Int,
            ExprKind::ReadLine => Ty::String,
            ExprKind::This => self.visit_this(pos),
            ExprKind::Unary(unary) => {
                self.visit_expr(&mut unary.operand);
                let t = ty_of(&unary.operand);
                let ok = match unary.op {
                    UnaryOp::Neg => *t == Ty::Int,
                    UnaryOp::Not => *t == Ty::Bool,
                };
                if t.no_error() && !ok {
                    self.diags.issue(
                        pos,
                        SemanticError::IncompatUnOp {
                            op: unary.op.as_str().into(),
                            operand: t.to_string(),
                        },
                    );
                }
                // Guess the nominal result even on error so the mistake
                // does not cascade.
                match unary.op {
                    UnaryOp::Neg => Ty::Int,
                    UnaryOp::Not => Ty::Bool,
                }
            }
            ExprKind::Binary(binary) => {
                self.visit_expr(&mut binary.lhs);
                self.visit_expr(&mut binary.rhs);
                let t1 = ty_of(&binary.lhs).clone();
                let t2 = ty_of(&binary.rhs).clone();
                if t1.no_error() && t2.no_error() && !binary_compatible(binary.op, &t1, &t2) {
                    self.diags.issue(
                        pos,
                        SemanticError::IncompatBinOp {
                            lhs: t1.to_string(),
                            op: binary.op.as_str().into(),
                            rhs: t2.to_string(),
                        },
                    );
                }
                binary_result(binary.op)
            }
            ExprKind::NewArray(new_array) => {
                let elem = resolve_type_lit(&mut new_array.elem_type, &self.ctx, &mut self.diags);
                self.visit_expr(&mut new_array.length);
                let ty = if elem.is_void() {
                    self.diags
                        .issue(new_array.elem_type.pos, SemanticError::BadArrElement);
                    Ty::Error
                } else {
                    Ty::Array(Box::new(elem))
                };
                let lt = ty_of(&new_array.length);
                if lt.no_error() && *lt != Ty::Int {
                    self.diags
                        .issue(new_array.length.pos, SemanticError::BadNewArrayLength);
                }
                ty
            }
            ExprKind::NewClass(new_class) => self.visit_new_class(new_class, pos),
            ExprKind::VarSel(var_sel) => self.visit_var_sel(var_sel, pos),
            ExprKind::IndexSel(index_sel) => {
                self.visit_expr(&mut index_sel.array);
                self.visit_expr(&mut index_sel.index);
                let at = ty_of(&index_sel.array).clone();
                match at {
                    Ty::Array(elem) => {
                        let it = ty_of(&index_sel.index);
                        if it.no_error() && *it != Ty::Int {
                            self.diags.issue(pos, SemanticError::SubNotInt);
                        }
                        *elem
                    }
                    _ => {
                        if at.no_error() {
                            self.diags.issue(index_sel.array.pos, SemanticError::NotArray);
                        }
                        Ty::Error
                    }
                }
            }
            ExprKind::Call(call) => self.visit_call(call, pos),
            ExprKind::ClassTest(test) => {
                self.visit_expr(&mut test.obj);
                let ot = ty_of(&test.obj);
                if ot.no_error() && !ot.is_class() {
                    self.diags
                        .issue(pos, SemanticError::NotClass { ty: ot.to_string() });
                }
                match self.ctx.lookup_class(&test.name) {
                    Some(sym) => test.symbol = Some(sym),
                    None => self.diags.issue(
                        pos,
                        SemanticError::ClassNotFound {
                            name: test.name.clone(),
                        },
                    ),
                }
                Ty::Bool
            }
            ExprKind::ClassCast(cast) => {
                self.visit_expr(&mut cast.obj);
                let ot = ty_of(&cast.obj);
                if ot.no_error() && !ot.is_class() {
                    self.diags
                        .issue(pos, SemanticError::NotClass { ty: ot.to_string() });
                }
                match self.ctx.lookup_class(&cast.name) {
                    Some(sym) => {
                        cast.symbol = Some(sym);
                        self.ctx
                            .table()
                            .symbol(sym)
                            .as_class()
                            .map(|c| Ty::Class(c.ty.clone()))
                            .unwrap_or(Ty::Error)
                    }
                    None => {
                        self.diags.issue(
                            pos,
                            SemanticError::ClassNotFound {
                                name: cast.name.clone(),
                            },
                        );
                        Ty::Error
                    }
                }
            }
            ExprKind::Lambda(lambda) => self.visit_lambda_expr(lambda),
        };
        expr.ty = Some(ty);
    }

    fn visit_this(&mut self, pos: Pos) -> Ty {
        if self.current_method_is_static() {
            self.diags.issue(pos, SemanticError::ThisInStaticFunc);
        } else if self.ctx.in_lambda() {
            self.ctx.record_capture(Capture::This);
        }
        self.current_class_ty().map(Ty::Class).unwrap_or(Ty::Error)
    }

    fn visit_new_class(&mut self, new_class: &mut NewClass, pos: Pos) -> Ty {
        match self.ctx.lookup_class(&new_class.name) {
            Some(sym) => {
                new_class.symbol = Some(sym);
                let Some((ty, is_abstract)) = self
                    .ctx
                    .table()
                    .symbol(sym)
                    .as_class()
                    .map(|c| (Ty::Class(c.ty.clone()), c.is_abstract))
                else {
                    return Ty::Error;
                };
                if is_abstract {
                    self.diags.issue(
                        pos,
                        SemanticError::NewAbstractClass {
                            name: new_class.name.clone(),
                        },
                    );
                }
                ty
            }
            None => {
                self.diags.issue(
                    pos,
                    SemanticError::ClassNotFound {
                        name: new_class.name.clone(),
                    },
                );
                Ty::Error
            }
        }
    }

    /// A bare name resolves to a local, a visible member (rewritten to go
    /// through `this`), a method, or a class name; a selection resolves
    /// against the receiver's class.
    pub(super) fn visit_var_sel(&mut self, var_sel: &mut VarSel, pos: Pos) -> Ty {
        if var_sel.receiver.is_none() {
            let look_pos = self.local_var_def_pos.unwrap_or(pos);
            if let Some(sym_id) = self.ctx.lookup_before(&var_sel.name, look_pos) {
                let kind = self.ctx.table().symbol(sym_id).kind.clone();
                match kind {
                    SymbolKind::Var(var) => {
                        var_sel.symbol = Some(sym_id);
                        if self.ctx.table().is_member_var(sym_id) {
                            if self.current_method_is_static() {
                                self.diags.issue(
                                    pos,
                                    SemanticError::RefNonStatic {
                                        field: var_sel.name.clone(),
                                        method: self.current_method_name(),
                                    },
                                );
                            } else {
                                var_sel.uses_this = true;
                                if self.ctx.in_lambda() {
                                    self.ctx.record_capture(Capture::This);
                                }
                            }
                        } else if self.ctx.in_lambda() {
                            self.record_var_capture(sym_id);
                        }
                        return var.ty;
                    }
                    SymbolKind::Class(class) => {
                        var_sel.is_class_name = true;
                        return Ty::Class(class.ty);
                    }
                    SymbolKind::Method(method) => {
                        if !method.is_static && self.current_method_is_static() {
                            self.diags.issue(
                                pos,
                                SemanticError::RefNonStatic {
                                    field: var_sel.name.clone(),
                                    method: self.current_method_name(),
                                },
                            );
                        } else {
                            var_sel.is_method = true;
                        }
                        return Ty::Fun(Box::new(method.ty));
                    }
                    SymbolKind::Lambda(_) => {}
                }
            }
            self.diags.issue(
                pos,
                SemanticError::UndeclVar {
                    name: var_sel.name.clone(),
                },
            );
            return Ty::Error;
        }

        if let Some(receiver) = var_sel.receiver.as_deref_mut() {
            self.visit_expr(receiver);
        }
        self.resolve_member(var_sel, pos)
    }

    /// Record a capture of a non-member variable read or assigned from
    /// inside a lambda, unless it is defined within the lambda itself.
    pub(super) fn record_var_capture(&mut self, sym_id: crate::sema::symbol::SymbolId) {
        let Some(defined_in) = self.ctx.table().symbol(sym_id).defined_in else {
            return;
        };
        let hoisted = self.ctx.table().hoist_locals(defined_in);
        if self.ctx.table().scope(hoisted).kind == ScopeKind::Class {
            return;
        }
        if self.ctx.current_lambda_scope() != Some(hoisted) {
            self.ctx.record_capture(Capture::Var(sym_id));
        }
    }

    /// Resolve `receiver.name` once the receiver has been typed.
    ///
    /// Class-name receivers expose only static members; member variables
    /// behind an instance are protected, so only the owner's own
    /// hierarchy may read them. Non-class receivers produce `error`
    /// without a diagnostic.
    pub(super) fn resolve_member(&mut self, var_sel: &mut VarSel, pos: Pos) -> Ty {
        let Some(receiver) = var_sel.receiver.as_deref() else {
            return Ty::Error;
        };

        if let ExprKind::VarSel(r) = &receiver.kind {
            if r.is_class_name {
                let recv_ty = ty_of(receiver).to_string();
                let Some(scope) = self
                    .ctx
                    .lookup_class(&r.name)
                    .and_then(|c| self.ctx.table().symbol(c).as_class().map(|c| c.scope))
                else {
                    return Ty::Error;
                };
                if let Some(member) = self.ctx.table().lookup_in_class(scope, &var_sel.name) {
                    let kind = self.ctx.table().symbol(member).kind.clone();
                    match kind {
                        SymbolKind::Method(method) => {
                            if method.is_static {
                                var_sel.is_method = true;
                            } else {
                                self.diags.issue(
                                    pos,
                                    SemanticError::NotClassField {
                                        field: var_sel.name.clone(),
                                        ty: recv_ty,
                                    },
                                );
                            }
                            return Ty::Fun(Box::new(method.ty));
                        }
                        SymbolKind::Var(var) => {
                            var_sel.symbol = Some(member);
                            self.diags.issue(
                                pos,
                                SemanticError::NotClassField {
                                    field: var_sel.name.clone(),
                                    ty: recv_ty,
                                },
                            );
                            return var.ty;
                        }
                        _ => return Ty::Error,
                    }
                }
                self.diags.issue(
                    pos,
                    SemanticError::FieldNotFound {
                        field: var_sel.name.clone(),
                        ty: recv_ty,
                    },
                );
                return Ty::Error;
            }
        }

        let rt = ty_of(receiver).clone();
        if !rt.no_error() {
            return Ty::Error;
        }
        let Some(class_ty) = rt.as_class() else {
            return Ty::Error;
        };
        let Some(scope) = self
            .ctx
            .lookup_class(&class_ty.name)
            .and_then(|c| self.ctx.table().symbol(c).as_class().map(|c| c.scope))
        else {
            return Ty::Error;
        };
        let Some(member) = self.ctx.table().lookup_in_class(scope, &var_sel.name) else {
            self.diags.issue(
                pos,
                SemanticError::FieldNotFound {
                    field: var_sel.name.clone(),
                    ty: rt.to_string(),
                },
            );
            return Ty::Error;
        };

        let kind = self.ctx.table().symbol(member).kind.clone();
        match kind {
            SymbolKind::Var(var) => {
                var_sel.symbol = Some(member);
                let accessible = match (self.current_class_ty(), self.owner_class_ty(member)) {
                    (Some(current), Some(owner)) => {
                        Ty::Class(current).subtype_of(&Ty::Class(owner))
                    }
                    _ => false,
                };
                if !accessible {
                    self.diags.issue(
                        pos,
                        SemanticError::FieldNotAccess {
                            field: var_sel.name.clone(),
                            ty: rt.to_string(),
                        },
                    );
                }
                var.ty
            }
            SymbolKind::Method(method) => {
                var_sel.symbol = Some(member);
                var_sel.is_method = true;
                Ty::Fun(Box::new(method.ty))
            }
            _ => {
                self.diags.issue(
                    pos,
                    SemanticError::NotClassField {
                        field: var_sel.name.clone(),
                        ty: rt.to_string(),
                    },
                );
                Ty::Error
            }
        }
    }

    fn owner_class_ty(&self, member: crate::sema::symbol::SymbolId) -> Option<ClassTy> {
        let owner = self.ctx.table().owner_class_of(member)?;
        self.ctx
            .table()
            .symbol(owner)
            .as_class()
            .map(|c| c.ty.clone())
    }
}

fn binary_compatible(op: BinaryOp, lhs: &Ty, rhs: &Ty) -> bool {
    if op.is_arith() {
        *lhs == Ty::Int && *rhs == Ty::Int
    } else if op.is_logic() {
        *lhs == Ty::Bool && *rhs == Ty::Bool
    } else if op.is_eq() {
        lhs.subtype_of(rhs) || rhs.subtype_of(lhs)
    } else {
        // comparisons
        *lhs == Ty::Int && *rhs == Ty::Int
    }
}

fn binary_result(op: BinaryOp) -> Ty {
    if op.is_arith() { Ty::Int } else { Ty::Bool }
}
