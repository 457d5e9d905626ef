//! Source positions attached to diagnostics.

use std::fmt;

/// Row/column of the construct being evaluated, 1-based.
///
/// The compiler front end sets the current position on the runtime before
/// each operation; the runtime only stamps it onto diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Pos {
    pub row: u32,
    pub col: u32,
}

impl Pos {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Pos { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}
