// src/driver/mod.rs
//! The two-phase analysis pipeline.
//!
//! Each pass annotates the AST in place and collects diagnostics. Typing
//! never runs on a program naming rejected.

use crate::errors::Diagnostic;
use crate::frontend::ast::Program;
use crate::sema::scope::SymbolTable;
use crate::sema::{Namer, Typer};

/// How far the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    /// Stop after the naming pass.
    NameResolution,
    /// Run naming and typing.
    TypeCheck,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: Target::TypeCheck,
        }
    }
}

/// The result of analysis: the scope/symbol arena and the diagnostics,
/// sorted by source position.
#[derive(Debug)]
pub struct Analysis {
    pub table: SymbolTable,
    pub errors: Vec<Diagnostic>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Render the diagnostics in their fixed line format, one per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for error in &self.errors {
            out.push_str(&error.to_string());
            out.push('\n');
        }
        out
    }
}

/// Run semantic analysis over a parsed program.
pub fn analyze(program: &mut Program, config: &Config) -> Analysis {
    let (table, diags) = Namer::new(SymbolTable::new()).run(program);
    if diags.has_errors() || config.target == Target::NameResolution {
        return Analysis {
            table,
            errors: diags.into_sorted(),
        };
    }

    let (table, diags) = Typer::new(table).run(program);
    Analysis {
        table,
        errors: diags.into_sorted(),
    }
}
