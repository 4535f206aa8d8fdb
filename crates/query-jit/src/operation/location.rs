use std::fmt;

use async_graphql_parser::Pos;

/// A source position within the executable document. 65K lines or columns is
/// plenty for any query we are willing to compile.
#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize)]
pub struct Location {
    /// One-based line number.
    pub line: u16,
    /// One-based column number.
    pub column: u16,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl TryFrom<Pos> for Location {
    type Error = ();

    fn try_from(pos: Pos) -> Result<Self, Self::Error> {
        Ok(Self {
            line: pos.line.try_into().map_err(|_| ())?,
            column: pos.column.try_into().map_err(|_| ())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_line_column_object() {
        let location = Location { line: 3, column: 12 };
        assert_eq!(
            serde_json::to_value(location).unwrap(),
            serde_json::json!({"line": 3, "column": 12})
        );
    }

    #[test]
    fn rejects_out_of_range_positions() {
        let pos = Pos {
            line: usize::from(u16::MAX) + 1,
            column: 1,
        };
        assert!(Location::try_from(pos).is_err());
    }
}
