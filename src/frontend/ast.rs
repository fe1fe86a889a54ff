// src/frontend/ast.rs
//! The abstract syntax tree handed to `driver::analyze` by an external
//! parser.
//!
//! Every node carries its source position plus annotation slots that the
//! naming and typing passes fill in (`symbol`, `scope`, `ty`, `returns`,
//! and the selector flags). The whole tree round-trips through serde with
//! annotations intact.

use crate::frontend::Pos;
use crate::sema::scope::ScopeId;
use crate::sema::symbol::SymbolId;
use crate::sema::types::Ty;
use serde::{Deserialize, Serialize};

/// A complete program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub classes: Vec<ClassDef>,
    /// Root of the scope forest; set by naming.
    pub global_scope: Option<ScopeId>,
    /// The `Main` class symbol, when a legal entry point exists.
    pub main_class: Option<SymbolId>,
}

impl Program {
    pub fn new(classes: Vec<ClassDef>) -> Self {
        Self {
            classes,
            global_scope: None,
            main_class: None,
        }
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Id {
    pub name: String,
    pub pos: Pos,
}

impl Id {
    pub fn new(name: impl Into<String>, pos: Pos) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    /// Base class reference; cleared by naming when the name is unknown.
    pub parent: Option<Id>,
    pub is_abstract: bool,
    pub fields: Vec<FieldDef>,
    pub pos: Pos,
    pub symbol: Option<SymbolId>,
}

impl ClassDef {
    pub fn new(
        name: impl Into<String>,
        parent: Option<Id>,
        is_abstract: bool,
        fields: Vec<FieldDef>,
        pos: Pos,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            is_abstract,
            fields,
            pos,
            symbol: None,
        }
    }
}

/// A class member: a field variable or a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldDef {
    Var(VarDef),
    Method(MethodDef),
}

/// A typed variable definition: class fields and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    pub type_lit: TypeLit,
    pub id: Id,
    pub pos: Pos,
    pub symbol: Option<SymbolId>,
}

impl VarDef {
    pub fn new(type_lit: TypeLit, id: Id, pos: Pos) -> Self {
        Self {
            type_lit,
            id,
            pos,
            symbol: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub is_static: bool,
    pub is_abstract: bool,
    pub return_type: TypeLit,
    pub id: Id,
    pub params: Vec<VarDef>,
    /// `None` iff the method is abstract.
    pub body: Option<Block>,
    pub pos: Pos,
    pub symbol: Option<SymbolId>,
}

/// A type literal as written in source. Resolution stores the denoted
/// type in `ty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeLit {
    pub kind: TypeLitKind,
    pub pos: Pos,
    pub ty: Option<Ty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeLitKind {
    Int,
    Bool,
    String,
    Void,
    Class(String),
    Array(Box<TypeLit>),
    Fun {
        ret: Box<TypeLit>,
        params: Vec<TypeLit>,
    },
}

impl TypeLit {
    pub fn new(kind: TypeLitKind, pos: Pos) -> Self {
        Self {
            kind,
            pos,
            ty: None,
        }
    }

    pub fn int(pos: Pos) -> Self {
        Self::new(TypeLitKind::Int, pos)
    }

    pub fn bool(pos: Pos) -> Self {
        Self::new(TypeLitKind::Bool, pos)
    }

    pub fn string(pos: Pos) -> Self {
        Self::new(TypeLitKind::String, pos)
    }

    pub fn void(pos: Pos) -> Self {
        Self::new(TypeLitKind::Void, pos)
    }

    pub fn class(name: impl Into<String>, pos: Pos) -> Self {
        Self::new(TypeLitKind::Class(name.into()), pos)
    }

    pub fn array(elem: TypeLit, pos: Pos) -> Self {
        Self::new(TypeLitKind::Array(Box::new(elem)), pos)
    }

    pub fn fun(ret: TypeLit, params: Vec<TypeLit>, pos: Pos) -> Self {
        Self::new(
            TypeLitKind::Fun {
                ret: Box::new(ret),
                params,
            },
            pos,
        )
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub pos: Pos,
    pub scope: Option<ScopeId>,
    /// Whether the block definitely returns on all paths; set by typing.
    pub returns: bool,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, pos: Pos) -> Self {
        Self {
            stmts,
            pos,
            scope: None,
            returns: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Pos,
    /// Whether this statement definitely returns on all paths; set by typing.
    pub returns: bool,
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: Pos) -> Self {
        Self {
            kind,
            pos,
            returns: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Block(Block),
    LocalVarDef(LocalVarDef),
    Assign(Assign),
    ExprEval(Expr),
    Skip,
    If(If),
    While(While),
    For(For),
    Break,
    Return(ReturnStmt),
    Print(Vec<Expr>),
}

/// A local variable definition. `type_lit` is `None` for `var`
/// declarations, whose type is taken from the initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVarDef {
    pub type_lit: Option<TypeLit>,
    pub id: Id,
    /// Position of the `=` sign, when an initializer is present.
    pub assign_pos: Option<Pos>,
    pub init: Option<Expr>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct While {
    pub cond: Expr,
    pub body: Box<Stmt>,
}

/// `for (init; cond; update) body`. The loop owns one local scope holding
/// the init statement and the body's statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct For {
    pub init: Box<Stmt>,
    pub cond: Expr,
    pub update: Box<Stmt>,
    pub body: Block,
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub expr: Option<Expr>,
    /// The returned value's type (`void` when no expression); set by typing.
    pub return_type: Option<Ty>,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
    /// Set by typing; `error` when the expression is ill-typed.
    pub ty: Option<Ty>,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Pos) -> Self {
        Self {
            kind,
            pos,
            ty: None,
        }
    }

    pub fn int_lit(value: i32, pos: Pos) -> Self {
        Self::new(ExprKind::IntLit(value), pos)
    }

    pub fn bool_lit(value: bool, pos: Pos) -> Self {
        Self::new(ExprKind::BoolLit(value), pos)
    }

    pub fn string_lit(value: impl Into<String>, pos: Pos) -> Self {
        Self::new(ExprKind::StringLit(value.into()), pos)
    }

    pub fn null_lit(pos: Pos) -> Self {
        Self::new(ExprKind::NullLit, pos)
    }

    pub fn this(pos: Pos) -> Self {
        Self::new(ExprKind::This, pos)
    }

    pub fn unary(op: UnaryOp, operand: Expr, pos: Pos) -> Self {
        Self::new(
            ExprKind::Unary(Unary {
                op,
                operand: Box::new(operand),
            }),
            pos,
        )
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, pos: Pos) -> Self {
        Self::new(
            ExprKind::Binary(Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
            pos,
        )
    }

    /// A bare name.
    pub fn var(name: impl Into<String>, pos: Pos) -> Self {
        Self::new(ExprKind::VarSel(VarSel::new(None, name)), pos)
    }

    /// A member selection `receiver.name`.
    pub fn sel(receiver: Expr, name: impl Into<String>, pos: Pos) -> Self {
        Self::new(ExprKind::VarSel(VarSel::new(Some(Box::new(receiver)), name)), pos)
    }

    pub fn index(array: Expr, index: Expr, pos: Pos) -> Self {
        Self::new(
            ExprKind::IndexSel(IndexSel {
                array: Box::new(array),
                index: Box::new(index),
            }),
            pos,
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>, pos: Pos) -> Self {
        Self::new(
            ExprKind::Call(Call {
                callee: Box::new(callee),
                args,
                symbol: None,
                is_array_length: false,
            }),
            pos,
        )
    }

    pub fn new_class(name: impl Into<String>, pos: Pos) -> Self {
        Self::new(
            ExprKind::NewClass(NewClass {
                name: name.into(),
                symbol: None,
            }),
            pos,
        )
    }

    pub fn new_array(elem_type: TypeLit, length: Expr, pos: Pos) -> Self {
        Self::new(
            ExprKind::NewArray(NewArray {
                elem_type,
                length: Box::new(length),
            }),
            pos,
        )
    }

    pub fn class_test(obj: Expr, name: impl Into<String>, pos: Pos) -> Self {
        Self::new(
            ExprKind::ClassTest(ClassTest {
                obj: Box::new(obj),
                name: name.into(),
                symbol: None,
            }),
            pos,
        )
    }

    pub fn class_cast(obj: Expr, name: impl Into<String>, pos: Pos) -> Self {
        Self::new(
            ExprKind::ClassCast(ClassCast {
                obj: Box::new(obj),
                name: name.into(),
                symbol: None,
            }),
            pos,
        )
    }

    pub fn lambda(params: Vec<VarDef>, body: LambdaBody, pos: Pos) -> Self {
        Self::new(
            ExprKind::Lambda(Lambda {
                params,
                body,
                scope: None,
                symbol: None,
            }),
            pos,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    IntLit(i32),
    BoolLit(bool),
    StringLit(String),
    NullLit,
    ReadInt,
    ReadLine,
    This,
    Unary(Unary),
    Binary(Binary),
    NewClass(NewClass),
    NewArray(NewArray),
    VarSel(VarSel),
    IndexSel(IndexSel),
    Call(Call),
    ClassTest(ClassTest),
    ClassCast(ClassCast),
    Lambda(Lambda),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClass {
    pub name: String,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArray {
    pub elem_type: TypeLit,
    pub length: Box<Expr>,
}

/// A variable access or member selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSel {
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub symbol: Option<SymbolId>,
    /// The bare name denotes a class.
    pub is_class_name: bool,
    /// The selection denotes a method.
    pub is_method: bool,
    /// A bare member-variable access rewritten to go through `this`.
    pub uses_this: bool,
}

impl VarSel {
    pub fn new(receiver: Option<Box<Expr>>, name: impl Into<String>) -> Self {
        Self {
            receiver,
            name: name.into(),
            symbol: None,
            is_class_name: false,
            is_method: false,
            uses_this: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSel {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    /// The resolved method, for method calls.
    pub symbol: Option<SymbolId>,
    /// The call is the array `length()` intrinsic.
    pub is_array_length: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassTest {
    pub obj: Box<Expr>,
    pub name: String,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCast {
    pub obj: Box<Expr>,
    pub name: String,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub params: Vec<VarDef>,
    pub body: LambdaBody,
    pub scope: Option<ScopeId>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LambdaBody {
    /// Expression body; the expression sits in an anonymous local scope so
    /// capture analysis treats both body forms alike.
    Expr {
        expr: Box<Expr>,
        scope: Option<ScopeId>,
    },
    Block(Block),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn is_arith(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_logic(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_eq(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }
}
