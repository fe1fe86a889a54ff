// src/sema/types.rs

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Resolved types in the Latte type system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Ty {
    Int,
    Bool,
    String,
    Void,
    /// The type of the `null` literal; subtype of every class type.
    Null,
    /// Recovery sentinel. Absorbs every relation so one fault does not
    /// cascade into follow-up diagnostics.
    Error,
    Array(Box<Ty>),
    /// A value-level function type.
    Fun(Box<FunTy>),
    /// A function type as written in source (a type-literal annotation or
    /// an unfinalized lambda signature). Never produced by inference.
    TFun(Box<FunTy>),
    Class(ClassTy),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunTy {
    pub ret: Box<Ty>,
    pub params: SmallVec<[Ty; 4]>,
}

impl FunTy {
    pub fn new(ret: Ty, params: impl IntoIterator<Item = Ty>) -> Self {
        Self {
            ret: Box::new(ret),
            params: params.into_iter().collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A class type, identified by name. The ancestor chain is embedded
/// parent-first at construction, so subtyping needs no symbol registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTy {
    pub name: String,
    pub parent: Option<Box<ClassTy>>,
}

impl ClassTy {
    pub fn new(name: impl Into<String>, parent: Option<ClassTy>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(Box::new),
        }
    }

    /// This class followed by its ancestors, nearest first.
    pub fn chain(&self) -> impl Iterator<Item = &ClassTy> {
        std::iter::successors(Some(self), |c| c.parent.as_deref())
    }
}

// Class types compare by name; the two function variants compare with
// each other componentwise (they print identically, and printed form is
// what annotations are matched by).
impl PartialEq for Ty {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ty::Int, Ty::Int)
            | (Ty::Bool, Ty::Bool)
            | (Ty::String, Ty::String)
            | (Ty::Void, Ty::Void)
            | (Ty::Null, Ty::Null)
            | (Ty::Error, Ty::Error) => true,
            (Ty::Array(a), Ty::Array(b)) => a == b,
            (Ty::Fun(a) | Ty::TFun(a), Ty::Fun(b) | Ty::TFun(b)) => a == b,
            (Ty::Class(a), Ty::Class(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Eq for Ty {}

impl PartialEq for FunTy {
    fn eq(&self, other: &Self) -> bool {
        self.ret == other.ret && self.params == other.params
    }
}

impl Eq for FunTy {}

impl PartialEq for ClassTy {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ClassTy {}

impl Ty {
    pub fn is_base(&self) -> bool {
        matches!(self, Ty::Int | Ty::Bool | Ty::String)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Ty::Class(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ty::Array(_))
    }

    pub fn is_fun(&self) -> bool {
        matches!(self, Ty::Fun(_) | Ty::TFun(_))
    }

    pub fn as_fun(&self) -> Option<&FunTy> {
        match self {
            Ty::Fun(f) | Ty::TFun(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassTy> {
        match self {
            Ty::Class(c) => Some(c),
            _ => None,
        }
    }

    /// False iff the type contains the error sentinel anywhere.
    pub fn no_error(&self) -> bool {
        match self {
            Ty::Error => false,
            Ty::Array(elem) => elem.no_error(),
            Ty::Fun(f) | Ty::TFun(f) => f.ret.no_error() && f.params.iter().all(Ty::no_error),
            _ => true,
        }
    }

    /// The subtype relation.
    ///
    /// Reflexive; `error` absorbs both directions; `null` is below every
    /// class; classes follow the ancestor chain; function types are
    /// covariant in the result and contravariant in the parameters.
    pub fn subtype_of(&self, other: &Ty) -> bool {
        if matches!(self, Ty::Error) || matches!(other, Ty::Error) {
            return true;
        }
        if self == other {
            return true;
        }
        match (self, other) {
            (Ty::Null, Ty::Class(_)) => true,
            (Ty::Class(c), Ty::Class(d)) => c.chain().any(|a| a.name == d.name),
            (Ty::Fun(a) | Ty::TFun(a), Ty::Fun(b) | Ty::TFun(b)) => {
                a.arity() == b.arity()
                    && a.ret.subtype_of(&b.ret)
                    && a.params
                        .iter()
                        .zip(b.params.iter())
                        .all(|(p, q)| q.subtype_of(p))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => write!(f, "int"),
            Ty::Bool => write!(f, "bool"),
            Ty::String => write!(f, "string"),
            Ty::Void => write!(f, "void"),
            Ty::Null => write!(f, "null"),
            Ty::Error => write!(f, "Error"),
            Ty::Array(elem) => write!(f, "{}[]", elem),
            Ty::Fun(fun) | Ty::TFun(fun) => write!(f, "{}", fun),
            Ty::Class(c) => write!(f, "class {}", c.name),
        }
    }
}

impl fmt::Display for FunTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.ret)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_chain() -> (Ty, Ty, Ty) {
        let a = ClassTy::new("A", None);
        let b = ClassTy::new("B", Some(a.clone()));
        let c = ClassTy::new("C", Some(b.clone()));
        (Ty::Class(a), Ty::Class(b), Ty::Class(c))
    }

    #[test]
    fn class_equality_is_by_name() {
        let (a, _, _) = class_chain();
        let a_again = Ty::Class(ClassTy::new("A", Some(ClassTy::new("Other", None))));
        assert_eq!(a, a_again);
    }

    #[test]
    fn class_subtyping_follows_the_ancestor_chain() {
        let (a, b, c) = class_chain();
        assert!(c.subtype_of(&a));
        assert!(c.subtype_of(&b));
        assert!(b.subtype_of(&a));
        assert!(!a.subtype_of(&b));
        assert!(Ty::Null.subtype_of(&c));
        assert!(!Ty::Int.subtype_of(&a));
    }

    #[test]
    fn error_absorbs_both_directions() {
        assert!(Ty::Error.subtype_of(&Ty::Int));
        assert!(Ty::Int.subtype_of(&Ty::Error));
        assert!(!Ty::Array(Box::new(Ty::Error)).no_error());
        assert!(!Ty::Fun(Box::new(FunTy::new(Ty::Error, []))).no_error());
    }

    #[test]
    fn function_subtyping_is_contravariant_in_parameters() {
        let (a, b, _) = class_chain();
        // f : (A) -> B, g : (B) -> A; f <: g since B <: A twice over.
        let f = Ty::Fun(Box::new(FunTy::new(b.clone(), [a.clone()])));
        let g = Ty::Fun(Box::new(FunTy::new(a.clone(), [b.clone()])));
        assert!(f.subtype_of(&g));
        assert!(!g.subtype_of(&f));
        // Arity must match.
        let h = Ty::Fun(Box::new(FunTy::new(b.clone(), [a.clone(), a.clone()])));
        assert!(!h.subtype_of(&g));
    }

    #[test]
    fn literal_and_value_function_types_compare_equal() {
        let f = FunTy::new(Ty::Int, [Ty::Bool]);
        assert_eq!(Ty::Fun(Box::new(f.clone())), Ty::TFun(Box::new(f)));
    }

    #[test]
    fn display_matches_the_printable_grammar() {
        assert_eq!(Ty::Array(Box::new(Ty::Int)).to_string(), "int[]");
        assert_eq!(
            Ty::Fun(Box::new(FunTy::new(Ty::Void, [Ty::Int, Ty::Bool]))).to_string(),
            "void(int, bool)"
        );
        let (_, b, _) = class_chain();
        assert_eq!(b.to_string(), "class B");
        assert_eq!(
            Ty::Array(Box::new(Ty::Fun(Box::new(FunTy::new(Ty::Int, []))))).to_string(),
            "int()[]"
        );
    }
}
