// src/sema/symbol.rs

use crate::frontend::Pos;
use crate::sema::scope::ScopeId;
use crate::sema::types::{ClassTy, FunTy, Ty};
use serde::{Deserialize, Serialize};

/// Index of a symbol in the `SymbolTable` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub pos: Pos,
    /// Scope this symbol is declared in; set when the symbol is declared.
    pub defined_in: Option<ScopeId>,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolKind {
    Var(VarSymbol),
    Method(MethodSymbol),
    Class(ClassSymbol),
    Lambda(LambdaSymbol),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSymbol {
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub ty: FunTy,
    /// The scope holding the parameters (and `this` for non-static methods).
    pub formal: ScopeId,
    pub is_static: bool,
    pub is_abstract: bool,
    /// The class declaring or inheriting-and-overriding this method.
    pub owner: SymbolId,
    /// The program entry point, `Main.main`.
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub ty: ClassTy,
    pub scope: ScopeId,
    pub parent: Option<SymbolId>,
    pub is_abstract: bool,
    pub is_main: bool,
}

/// A lambda, named `lambda@(L,C)` after its position. The signature starts
/// as `TFun(null, params)` and is finalized by typing once the body's
/// return types are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaSymbol {
    pub ty: Ty,
    pub scope: ScopeId,
    /// Return types accumulated from `return` statements in the body.
    pub return_types: Vec<Ty>,
    /// Symbols referenced from the body but defined outside the lambda.
    pub captured: Vec<Capture>,
}

/// One captured entity. Class members are reached through `this`, so
/// `this` is the captured entity for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capture {
    This,
    Var(SymbolId),
}

impl Symbol {
    pub fn is_var(&self) -> bool {
        matches!(self.kind, SymbolKind::Var(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, SymbolKind::Class(_))
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self.kind, SymbolKind::Lambda(_))
    }

    pub fn as_var(&self) -> Option<&VarSymbol> {
        match &self.kind {
            SymbolKind::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodSymbol> {
        match &self.kind {
            SymbolKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassSymbol> {
        match &self.kind {
            SymbolKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&LambdaSymbol> {
        match &self.kind {
            SymbolKind::Lambda(l) => Some(l),
            _ => None,
        }
    }

    /// The symbol's type as a value type.
    pub fn ty(&self) -> Ty {
        match &self.kind {
            SymbolKind::Var(v) => v.ty.clone(),
            SymbolKind::Method(m) => Ty::Fun(Box::new(m.ty.clone())),
            SymbolKind::Class(c) => Ty::Class(c.ty.clone()),
            SymbolKind::Lambda(l) => l.ty.clone(),
        }
    }
}
