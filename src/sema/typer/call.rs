// src/sema/typer/call.rs
//! Call checking, dispatched by the shape of the callee.

use super::*;
use crate::frontend::ast::Call;
use crate::sema::symbol::SymbolId;
use crate::sema::types::FunTy;

enum CalleeShape {
    /// An immediately invoked lambda.
    Lambda,
    /// An unqualified name.
    Bare(String),
    /// A member selection.
    Receiver,
    /// Anything else; typed but never dispatched.
    Other,
}

impl Typer {
    pub(super) fn visit_call(&mut self, call: &mut Call, pos: Pos) -> Ty {
        let shape = match &call.callee.kind {
            ExprKind::Lambda(_) => CalleeShape::Lambda,
            ExprKind::VarSel(v) if v.receiver.is_none() => CalleeShape::Bare(v.name.clone()),
            ExprKind::VarSel(_) => CalleeShape::Receiver,
            _ => CalleeShape::Other,
        };
        match shape {
            CalleeShape::Lambda => self.call_lambda(call, pos),
            CalleeShape::Bare(name) => self.call_unqualified(call, &name, pos),
            CalleeShape::Receiver => self.call_with_receiver(call, pos),
            CalleeShape::Other => {
                self.visit_expr(&mut call.callee);
                self.visit_args(call);
                Ty::Error
            }
        }
    }

    fn visit_args(&mut self, call: &mut Call) {
        for arg in &mut call.args {
            self.visit_expr(arg);
        }
    }

    fn check_arg_types(&mut self, params: &[Ty], args: &[Expr]) {
        for (i, (expected, arg)) in params.iter().zip(args).enumerate() {
            let given = ty_of(arg);
            if given.no_error() && !given.subtype_of(expected) {
                self.diags.issue(
                    arg.pos,
                    SemanticError::BadArgType {
                        index: i + 1,
                        given: given.to_string(),
                        expected: expected.to_string(),
                    },
                );
            }
        }
    }

    fn call_lambda(&mut self, call: &mut Call, pos: Pos) -> Ty {
        self.visit_expr(&mut call.callee);
        self.visit_args(call);
        let callee_ty = ty_of(&call.callee).clone();
        let Some(f) = callee_ty.as_fun() else {
            return Ty::Error;
        };
        if call.args.len() != f.arity() {
            self.diags.issue(
                pos,
                SemanticError::BadCountArgLambda {
                    expected: f.arity(),
                    given: call.args.len(),
                },
            );
        }
        self.check_arg_types(&f.params, &call.args);
        (*f.ret).clone()
    }

    /// An unqualified call resolves to a method of the current class
    /// chain first, then to a local or captured callable.
    fn call_unqualified(&mut self, call: &mut Call, name: &str, pos: Pos) -> Ty {
        self.visit_args(call);

        let class_member = self
            .ctx
            .current_class()
            .and_then(|c| self.ctx.table().symbol(c).as_class().map(|c| c.scope))
            .and_then(|scope| self.ctx.table().lookup_in_class(scope, name));

        if let Some(member) = class_member {
            let kind = self.ctx.table().symbol(member).kind.clone();
            return match kind {
                SymbolKind::Method(method) => {
                    if self.current_method_is_static() && !method.is_static {
                        self.diags.issue(
                            call.callee.pos,
                            SemanticError::RefNonStatic {
                                field: name.to_string(),
                                method: self.current_method_name(),
                            },
                        );
                    }
                    self.finish_method_call(call, member, &method.ty, name, pos)
                }
                _ => {
                    let ty = self.ctx.table().symbol(member).ty();
                    self.diags
                        .issue(pos, SemanticError::NotCallable { ty: ty.to_string() });
                    call.callee.ty = Some(ty);
                    Ty::Error
                }
            };
        }

        if let Some(local) = self.ctx.lookup_before(name, pos) {
            let sym = self.ctx.table().symbol(local);
            let sym_ty = sym.ty();
            let is_var = sym.is_var();
            let is_method = sym.is_method();
            if let Some(f) = sym_ty.as_fun() {
                let f = f.clone();
                if is_var && self.ctx.in_lambda() {
                    self.record_var_capture(local);
                }
                if let ExprKind::VarSel(v) = &mut call.callee.kind {
                    if is_var {
                        v.symbol = Some(local);
                    }
                    if is_method {
                        v.is_method = true;
                    }
                }
                call.callee.ty = Some(sym_ty.clone());
                if call.args.len() != f.arity() {
                    self.diags.issue(
                        pos,
                        SemanticError::BadArgCount {
                            name: name.to_string(),
                            expected: f.arity(),
                            given: call.args.len(),
                        },
                    );
                }
                self.check_arg_types(&f.params, &call.args);
                return (*f.ret).clone();
            }
            self.diags.issue(
                pos,
                SemanticError::NotCallable {
                    ty: sym_ty.to_string(),
                },
            );
            call.callee.ty = Some(sym_ty);
            return Ty::Error;
        }

        self.diags.issue(
            call.callee.pos,
            SemanticError::UndeclVar {
                name: name.to_string(),
            },
        );
        call.callee.ty = Some(Ty::Error);
        Ty::Error
    }

    fn call_with_receiver(&mut self, call: &mut Call, pos: Pos) -> Ty {
        // Type the receiver first.
        if let ExprKind::VarSel(v) = &mut call.callee.kind {
            if let Some(receiver) = v.receiver.as_deref_mut() {
                self.visit_expr(receiver);
            }
        }

        let Some((name, class_name_recv, new_class_recv, recv_ty)) = (match &call.callee.kind {
            ExprKind::VarSel(v) => v.receiver.as_deref().map(|receiver| {
                let class_name = match &receiver.kind {
                    ExprKind::VarSel(r) if r.is_class_name => Some(r.name.clone()),
                    _ => None,
                };
                (
                    v.name.clone(),
                    class_name,
                    matches!(receiver.kind, ExprKind::NewClass(_)),
                    ty_of(receiver).clone(),
                )
            }),
            _ => None,
        }) else {
            return Ty::Error;
        };

        // Static dispatch through a class name; instance members are not
        // reachable this way.
        if let Some(class_name) = class_name_recv {
            let Some(class_sym) = self.ctx.lookup_class(&class_name) else {
                call.callee.ty = Some(Ty::Error);
                return Ty::Error;
            };
            return self.dispatch_class_method(call, class_sym, &name, true, pos);
        }

        // Dispatch into a freshly constructed instance.
        if new_class_recv && recv_ty.no_error() {
            if let Some(class_ty) = recv_ty.as_class() {
                if let Some(class_sym) = self.ctx.lookup_class(&class_ty.name) {
                    let require_static = self
                        .current_class_ty()
                        .is_none_or(|c| c.name != class_ty.name)
                        && self.current_method_is_static();
                    return self.dispatch_class_method(call, class_sym, &name, require_static, pos);
                }
            }
        }

        // The array length intrinsic; any other non-class receiver has
        // no members to call.
        if name == "length" && !recv_ty.is_class() {
            if recv_ty.is_array() {
                self.visit_args(call);
                if !call.args.is_empty() {
                    self.diags.issue(
                        pos,
                        SemanticError::BadLengthArg {
                            given: call.args.len(),
                        },
                    );
                }
                call.is_array_length = true;
                call.callee.ty = Some(Ty::Int);
                return Ty::Int;
            }
            if recv_ty.no_error() {
                self.diags.issue(
                    call.callee.pos,
                    SemanticError::NotClassField {
                        field: name.clone(),
                        ty: recv_ty.to_string(),
                    },
                );
            }
            self.visit_args(call);
            call.callee.ty = Some(Ty::Error);
            return Ty::Error;
        }

        // Unsupported callee shape: resolve the selection for its own
        // diagnostics and type the arguments, but the call stays in
        // error.
        let callee_pos = call.callee.pos;
        if let ExprKind::VarSel(v) = &mut call.callee.kind {
            let ty = self.resolve_member(v, callee_pos);
            call.callee.ty = Some(ty);
        }
        self.visit_args(call);
        Ty::Error
    }

    fn dispatch_class_method(
        &mut self,
        call: &mut Call,
        class_sym: SymbolId,
        name: &str,
        require_static: bool,
        pos: Pos,
    ) -> Ty {
        self.visit_args(call);
        let Some((scope, class_ty)) = self
            .ctx
            .table()
            .symbol(class_sym)
            .as_class()
            .map(|c| (c.scope, Ty::Class(c.ty.clone())))
        else {
            return Ty::Error;
        };

        let Some(member) = self.ctx.table().lookup_in_class(scope, name) else {
            self.diags.issue(
                call.callee.pos,
                SemanticError::FieldNotFound {
                    field: name.to_string(),
                    ty: class_ty.to_string(),
                },
            );
            call.callee.ty = Some(Ty::Error);
            return Ty::Error;
        };

        let kind = self.ctx.table().symbol(member).kind.clone();
        match kind {
            SymbolKind::Method(method) => {
                call.symbol = Some(member);
                call.callee.ty = Some(Ty::Fun(Box::new(method.ty.clone())));
                let ret = (*method.ty.ret).clone();
                if require_static && !method.is_static {
                    self.diags.issue(
                        call.callee.pos,
                        SemanticError::NotClassField {
                            field: name.to_string(),
                            ty: class_ty.to_string(),
                        },
                    );
                    return ret;
                }
                if let ExprKind::VarSel(v) = &mut call.callee.kind {
                    v.symbol = Some(member);
                    v.is_method = true;
                }
                if method.ty.arity() != call.args.len() {
                    self.diags.issue(
                        pos,
                        SemanticError::BadArgCount {
                            name: name.to_string(),
                            expected: method.ty.arity(),
                            given: call.args.len(),
                        },
                    );
                }
                self.check_arg_types(&method.ty.params, &call.args);
                ret
            }
            _ => {
                let ty = self.ctx.table().symbol(member).ty();
                self.diags
                    .issue(pos, SemanticError::NotCallable { ty: ty.to_string() });
                call.callee.ty = Some(ty);
                Ty::Error
            }
        }
    }

    fn finish_method_call(
        &mut self,
        call: &mut Call,
        member: SymbolId,
        ty: &FunTy,
        name: &str,
        pos: Pos,
    ) -> Ty {
        call.symbol = Some(member);
        if let ExprKind::VarSel(v) = &mut call.callee.kind {
            v.symbol = Some(member);
            v.is_method = true;
        }
        call.callee.ty = Some(Ty::Fun(Box::new(ty.clone())));
        if ty.arity() != call.args.len() {
            self.diags.issue(
                pos,
                SemanticError::BadArgCount {
                    name: name.to_string(),
                    expected: ty.arity(),
                    given: call.args.len(),
                },
            );
        }
        self.check_arg_types(&ty.params, &call.args);
        (*ty.ret).clone()
    }
}
