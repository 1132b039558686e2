//! Error types for graph-list-format parsing and building.

use std::fmt;

use thiserror::Error;

/// Location in source text (1-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location at start of input.
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Translate a byte offset into `input` to a line/column pair.
    pub fn from_offset(input: &str, offset: usize) -> Self {
        let prefix = &input[..offset.min(input.len())];
        let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
        let column = prefix
            .rsplit('\n')
            .next()
            .map(|tail| tail.chars().count())
            .unwrap_or(0)
            + 1;
        Self { line, column }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexical or syntactic failure while tokenising the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// No directive could be parsed at this point.
    #[error("syntax error at {location}: unexpected input near '{snippet}'")]
    Syntax { location: Location, snippet: String },

    /// A directive started but one of its arguments was malformed.
    #[error("syntax error at {location}: malformed '{directive}' directive")]
    MalformedDirective {
        location: Location,
        directive: &'static str,
    },
}

/// Semantic failure while assembling graphs from a directive stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// Vertex ids must be 1-based and consecutive within their example.
    #[error("{location}: vertex id {found} out of order, expected {expected}")]
    VertexNumbering {
        location: Location,
        expected: u64,
        found: u64,
    },

    /// An edge referenced a vertex id never declared in this example.
    #[error("{location}: edge references undefined vertex {id}")]
    UndefinedVertex { location: Location, id: u64 },

    /// A directive that does not belong in this kind of file.
    #[error("{location}: '{directive}' is not allowed here")]
    MisplacedDirective {
        location: Location,
        directive: &'static str,
    },
}

/// Any failure turning text into graphs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GlfError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let input = "v 1 a\nv 2 b\n";
        assert_eq!(Location::from_offset(input, 0), Location::new(1, 1));
        assert_eq!(Location::from_offset(input, 2), Location::new(1, 3));
        assert_eq!(Location::from_offset(input, 6), Location::new(2, 1));
        assert_eq!(Location::from_offset(input, 8), Location::new(2, 3));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new(3, 7).to_string(), "3:7");
    }

    #[test]
    fn test_error_messages_carry_location() {
        let err = BuildError::UndefinedVertex {
            location: Location::new(4, 1),
            id: 9,
        };
        assert_eq!(err.to_string(), "4:1: edge references undefined vertex 9");

        let err = ParseError::Syntax {
            location: Location::new(2, 5),
            snippet: "q 1 2".to_string(),
        };
        assert!(err.to_string().contains("2:5"));
        assert!(err.to_string().contains("q 1 2"));
    }
}
