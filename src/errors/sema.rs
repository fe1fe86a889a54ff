// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

use crate::frontend::Pos;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("declaration of '{name}' here conflicts with earlier declaration at {earlier}")]
    #[diagnostic(code(E2001))]
    DeclConflict { name: String, earlier: Pos },

    #[error("overriding variable is not allowed for var '{name}'")]
    #[diagnostic(code(E2002))]
    OverridingVar { name: String },

    #[error("class '{name}' not found")]
    #[diagnostic(code(E2003))]
    ClassNotFound { name: String },

    #[error("illegal class inheritance (should be acyclic)")]
    #[diagnostic(code(E2004))]
    BadInheritance,

    #[error("overriding method '{name}' doesn't match the type signature in class '{parent}'")]
    #[diagnostic(code(E2005))]
    BadOverride { name: String, parent: String },

    #[error("'{name}' is not abstract and does not override all abstract methods")]
    #[diagnostic(code(E2006))]
    BadAbstractMethod { name: String },

    #[error("cannot instantiate abstract class '{name}'")]
    #[diagnostic(code(E2007))]
    NewAbstractClass { name: String },

    #[error("cannot declare identifier '{name}' as void type")]
    #[diagnostic(code(E2008))]
    BadVarType { name: String },

    #[error("cannot declare identifier '{name}' as void type")]
    #[diagnostic(code(E2009))]
    AssignVarVoid { name: String },

    #[error("array element type must be non-void known type")]
    #[diagnostic(code(E2010))]
    BadArrElement,

    #[error("arguments in function type must be non-void known type")]
    #[diagnostic(code(E2011))]
    VoidAsPara,

    #[error("incompatible operand: {op} {operand}")]
    #[diagnostic(code(E2012))]
    IncompatUnOp { op: String, operand: String },

    #[error("incompatible operands: {lhs} {op} {rhs}")]
    #[diagnostic(code(E2013))]
    IncompatBinOp {
        lhs: String,
        op: String,
        rhs: String,
    },

    #[error("test expression must have bool type")]
    #[diagnostic(code(E2014))]
    BadTestExpr,

    #[error("'break' is only allowed inside a loop")]
    #[diagnostic(code(E2015))]
    BreakOutOfLoop,

    #[error("missing return statement: control reaches end of non-void block")]
    #[diagnostic(code(E2016))]
    MissingReturn,

    #[error("incompatible return: {actual} given, {expected} expected")]
    #[diagnostic(code(E2017))]
    BadReturnType { expected: String, actual: String },

    #[error("incompatible return types in blocked expression")]
    #[diagnostic(code(E2018))]
    IncompatibleReturn,

    #[error("function '{name}' expects {expected} argument(s) but {given} given")]
    #[diagnostic(code(E2019))]
    BadArgCount {
        name: String,
        expected: usize,
        given: usize,
    },

    #[error("incompatible argument {index}: {given} given, {expected} expected")]
    #[diagnostic(code(E2020))]
    BadArgType {
        index: usize,
        given: String,
        expected: String,
    },

    #[error("function 'length' expects 0 argument(s) but {given} given")]
    #[diagnostic(code(E2021))]
    BadLengthArg { given: usize },

    #[error("{ty} is not a callable type")]
    #[diagnostic(code(E2022))]
    NotCallable { ty: String },

    #[error("[] can only be applied to arrays")]
    #[diagnostic(code(E2023))]
    NotArray,

    #[error("array subscript must be an integer")]
    #[diagnostic(code(E2024))]
    SubNotInt,

    #[error("{ty} is not a class type")]
    #[diagnostic(code(E2025))]
    NotClass { ty: String },

    #[error("undeclared variable '{name}'")]
    #[diagnostic(code(E2026))]
    UndeclVar { name: String },

    #[error("field '{field}' not found in '{ty}'")]
    #[diagnostic(code(E2027))]
    FieldNotFound { field: String, ty: String },

    #[error("field '{field}' of '{ty}' not accessible here")]
    #[diagnostic(code(E2028))]
    FieldNotAccess { field: String, ty: String },

    #[error("cannot access field '{field}' from '{ty}'")]
    #[diagnostic(code(E2029))]
    NotClassField { field: String, ty: String },

    #[error("cannot assign value to class member method '{name}'")]
    #[diagnostic(code(E2030))]
    AssignMethod { name: String },

    #[error("cannot assign value to captured variables in lambda expression")]
    #[diagnostic(code(E2031))]
    AssignCapture,

    #[error("can not use this in static function")]
    #[diagnostic(code(E2032))]
    ThisInStaticFunc,

    #[error("can not reference a non-static field '{field}' from static method '{method}'")]
    #[diagnostic(code(E2033))]
    RefNonStatic { field: String, method: String },

    #[error("no legal Main class named 'Main' was found")]
    #[diagnostic(code(E2034))]
    NoMainClass,

    #[error("lambda expression expects {expected} argument(s) but {given} given")]
    #[diagnostic(code(E2035))]
    BadCountArgLambda { expected: usize, given: usize },

    #[error("new array length must be an integer")]
    #[diagnostic(code(E2036))]
    BadNewArrayLength,

    #[error("incompatible argument {index}: {ty} given, int/bool/string expected")]
    #[diagnostic(code(E2037))]
    BadPrintArg { index: usize, ty: String },
}
