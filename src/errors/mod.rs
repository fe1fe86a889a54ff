// src/errors/mod.rs
//! Structured error reporting for the Latte front end.
//!
//! The semantic error taxonomy is closed; downstream test oracles depend
//! on the rendered messages byte-for-byte, so messages are never built
//! outside `SemanticError`.

pub mod report;
pub mod sema;

pub use report::{Diagnostic, Diagnostics};
pub use sema::SemanticError;
