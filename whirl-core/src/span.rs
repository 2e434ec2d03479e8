//! Source positions attached to tokens and diagnostics.

use std::fmt;

/// Location of a byte in a source buffer.
///
/// `offset` is a 0-based byte index; `line` and `column` are 1-based and
/// count bytes, not characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Position after consuming `byte`.
    pub fn advance(self, byte: u8) -> Self {
        if byte == b'\n' {
            Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            }
        } else {
            Self {
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
