// src/sema/typer/lambda.rs
//! Lambda bodies and result-type inference.
//!
//! A lambda's signature starts as `TFun(null, params)` from naming. An
//! expression body finalizes it to the body's type; a block body
//! finalizes it to the join of the collected return types, or reports
//! that no common bound exists.

use super::*;
use crate::frontend::ast::{Lambda, LambdaBody};
use crate::sema::infer::upper_bound;
use crate::sema::symbol::SymbolId;
use crate::sema::types::FunTy;

impl Typer {
    pub(super) fn visit_lambda_expr(&mut self, lambda: &mut Lambda) -> Ty {
        let (Some(scope), Some(sym)) = (lambda.scope, lambda.symbol) else {
            return Ty::Error;
        };
        self.ctx.open(scope);
        match &mut lambda.body {
            LambdaBody::Block(block) => {
                self.visit_block(block);
                let return_types = self
                    .ctx
                    .table()
                    .symbol(sym)
                    .as_lambda()
                    .map(|l| l.return_types.clone())
                    .unwrap_or_default();
                if return_types.is_empty() {
                    self.finalize(sym, Ty::Void);
                } else {
                    if !block.returns && return_types.iter().any(|t| !t.is_void()) {
                        self.diags.issue(block.pos, SemanticError::MissingReturn);
                    }
                    let joined = upper_bound(&return_types);
                    if joined.no_error() {
                        self.finalize(sym, joined);
                    } else {
                        self.diags.issue(block.pos, SemanticError::IncompatibleReturn);
                    }
                }
            }
            LambdaBody::Expr { expr, scope: expr_scope } => {
                let expr_scope = *expr_scope;
                if let Some(s) = expr_scope {
                    self.ctx.open(s);
                }
                self.visit_expr(expr);
                if expr_scope.is_some() {
                    self.ctx.close();
                }
                let ty = ty_of(expr).clone();
                self.finalize(sym, ty);
            }
        }
        self.ctx.close();
        self.ctx.table().symbol(sym).ty()
    }

    fn finalize(&mut self, sym: SymbolId, ret: Ty) {
        if let SymbolKind::Lambda(l) = &mut self.ctx.table_mut().symbol_mut(sym).kind {
            let params = l
                .ty
                .as_fun()
                .map(|f| f.params.clone())
                .unwrap_or_default();
            l.ty = Ty::Fun(Box::new(FunTy {
                ret: Box::new(ret),
                params,
            }));
        }
    }
}
