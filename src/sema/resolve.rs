// src/sema/resolve.rs
//! Type-literal resolution, shared by the naming and typing passes.

use crate::errors::{Diagnostics, SemanticError};
use crate::frontend::ast::{TypeLit, TypeLitKind};
use crate::sema::scope_stack::ScopeStack;
use crate::sema::types::{FunTy, Ty};

/// Resolve a type literal to the type it denotes, storing it on the node.
/// Unknown classes and `void` array elements resolve to `error`; function
/// literals resolve to the syntactic `TFun` kind.
pub fn resolve_type_lit(lit: &mut TypeLit, ctx: &ScopeStack, diags: &mut Diagnostics) -> Ty {
    let ty = match &mut lit.kind {
        TypeLitKind::Int => Ty::Int,
        TypeLitKind::Bool => Ty::Bool,
        TypeLitKind::String => Ty::String,
        TypeLitKind::Void => Ty::Void,
        TypeLitKind::Class(name) => match ctx.lookup_class(name) {
            Some(sym) => ctx
                .table()
                .symbol(sym)
                .as_class()
                .map(|c| Ty::Class(c.ty.clone()))
                .unwrap_or(Ty::Error),
            None => {
                diags.issue(lit.pos, SemanticError::ClassNotFound { name: name.clone() });
                Ty::Error
            }
        },
        TypeLitKind::Array(elem) => {
            let elem_ty = resolve_type_lit(elem, ctx, diags);
            if elem_ty == Ty::Error {
                Ty::Error
            } else if elem_ty.is_void() {
                diags.issue(lit.pos, SemanticError::BadArrElement);
                Ty::Error
            } else {
                Ty::Array(Box::new(elem_ty))
            }
        }
        TypeLitKind::Fun { ret, params } => {
            let ret_ty = resolve_type_lit(ret, ctx, diags);
            let mut param_tys = Vec::with_capacity(params.len());
            for param in params.iter_mut() {
                let ty = resolve_type_lit(param, ctx, diags);
                if ty.is_void() {
                    diags.issue(param.pos, SemanticError::VoidAsPara);
                }
                param_tys.push(ty);
            }
            Ty::TFun(Box::new(FunTy::new(ret_ty, param_tys)))
        }
    };
    lit.ty = Some(ty.clone());
    ty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Pos;
    use crate::sema::scope::SymbolTable;

    fn ctx() -> ScopeStack {
        ScopeStack::new(SymbolTable::new())
    }

    #[test]
    fn void_array_element_is_rejected() {
        let mut diags = Diagnostics::new();
        let mut lit = TypeLit::array(TypeLit::void(Pos::new(1, 1)), Pos::new(1, 1));
        let ty = resolve_type_lit(&mut lit, &ctx(), &mut diags);
        assert_eq!(ty, Ty::Error);
        assert_eq!(
            diags.iter().next().map(|d| d.error.clone()),
            Some(SemanticError::BadArrElement)
        );
    }

    #[test]
    fn unknown_class_resolves_to_error() {
        let mut diags = Diagnostics::new();
        let mut lit = TypeLit::class("Nope", Pos::new(2, 3));
        assert_eq!(resolve_type_lit(&mut lit, &ctx(), &mut diags), Ty::Error);
        assert!(diags.has_errors());
    }

    #[test]
    fn function_literal_resolves_to_the_syntactic_kind() {
        let mut diags = Diagnostics::new();
        let mut lit = TypeLit::fun(
            TypeLit::int(Pos::new(1, 1)),
            vec![TypeLit::bool(Pos::new(1, 5))],
            Pos::new(1, 1),
        );
        let ty = resolve_type_lit(&mut lit, &ctx(), &mut diags);
        assert!(matches!(ty, Ty::TFun(_)));
        assert!(!diags.has_errors());
    }

    #[test]
    fn void_function_parameter_is_rejected_but_kept() {
        let mut diags = Diagnostics::new();
        let mut lit = TypeLit::fun(
            TypeLit::int(Pos::new(1, 1)),
            vec![TypeLit::void(Pos::new(1, 5))],
            Pos::new(1, 1),
        );
        let ty = resolve_type_lit(&mut lit, &ctx(), &mut diags);
        assert_eq!(diags.len(), 1);
        assert!(matches!(ty, Ty::TFun(f) if f.arity() == 1));
    }
}
