// src/sema/mod.rs
pub mod infer;
pub mod namer;
pub mod resolve;
pub mod scope;
pub mod scope_stack;
pub mod symbol;
pub mod typer;
pub mod types;

pub use namer::Namer;
pub use scope::{Scope, ScopeId, ScopeKind, SymbolTable};
pub use scope_stack::ScopeStack;
pub use symbol::{Capture, Symbol, SymbolId, SymbolKind};
pub use typer::Typer;
pub use types::{ClassTy, FunTy, Ty};
