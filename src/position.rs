use std::fmt;

/// A 1-based line/column pair in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Sentinel for nodes that were not produced from source text.
    pub const UNKNOWN: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Position::UNKNOWN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown position")
        } else {
            write!(f, "line {}, column {}", self.line, self.column)
        }
    }
}
