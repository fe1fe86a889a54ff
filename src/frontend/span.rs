// src/frontend/span.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position, 1-indexed line and column.
///
/// Positions order lexicographically by `(line, column)`; diagnostics are
/// stable-sorted with this ordering before rendering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}
