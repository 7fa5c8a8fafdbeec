//! Row/column position tracking
//!
//! Rows and columns are zero-based. Columns count bytes, not characters, so a
//! point can always be converted back to a byte offset without decoding.

use std::fmt;

/// A position in source text (0-indexed, byte columns)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Position reached after appending `text` at this point
    pub fn advance(self, text: &[u8]) -> Self {
        let mut point = self;
        for &byte in text {
            if byte == b'\n' {
                point.row += 1;
                point.column = 0;
            } else {
                point.column += 1;
            }
        }
        point
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}
