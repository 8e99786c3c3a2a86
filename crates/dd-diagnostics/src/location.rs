//! Source locations inside descriptor documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a named document.
///
/// `line` and `column` are 1-based, `offset` is the 0-based byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Identifier of the document (usually a file path).
    pub document: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub fn new(document: impl Into<String>, line: usize, column: usize, offset: usize) -> Self {
        Self {
            document: document.into(),
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.document, self.line, self.column)
    }
}

/// Line-break index over a document, for offset to line/column lookups.
///
/// Scans the content once; each lookup is a binary search over the
/// recorded newline offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct LineIndex {
    document: String,
    line_breaks: Vec<usize>,
    total_length: usize,
}

impl LineIndex {
    /// Build the index for `content`.
    ///
    /// ```
    /// use dd_diagnostics::LineIndex;
    ///
    /// let index = LineIndex::new("doc.xml", "<a>\n  <b/>\n</a>");
    /// let loc = index.locate(6);
    /// assert_eq!((loc.line, loc.column), (2, 3));
    /// ```
    pub fn new(document: impl Into<String>, content: &str) -> Self {
        let line_breaks = content
            .char_indices()
            .filter_map(|(idx, ch)| if ch == '\n' { Some(idx) } else { None })
            .collect();

        Self {
            document: document.into(),
            line_breaks,
            total_length: content.len(),
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Convert a byte offset to a [`Location`]. Offsets past the end are clamped.
    pub fn locate(&self, offset: usize) -> Location {
        let offset = offset.min(self.total_length);

        // A newline belongs to the line it terminates.
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx,
        };

        let line_start = if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        };

        Location {
            document: self.document.clone(),
            line: row + 1,
            column: offset - line_start + 1,
            offset,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let index = LineIndex::new("empty.xml", "");
        assert_eq!(index.line_count(), 1);

        let loc = index.locate(0);
        assert_eq!((loc.line, loc.column, loc.offset), (1, 1, 0));
    }

    #[test]
    fn test_newline_belongs_to_its_line() {
        let index = LineIndex::new("doc.xml", "ab\ncd");
        let loc = index.locate(2);
        assert_eq!((loc.line, loc.column), (1, 3));

        let loc = index.locate(3);
        assert_eq!((loc.line, loc.column), (2, 1));
    }

    #[test]
    fn test_offset_is_clamped() {
        let index = LineIndex::new("doc.xml", "abc");
        assert_eq!(index.locate(99).offset, 3);
    }

    #[test]
    fn test_display() {
        let loc = Location::new("sun-ejb-jar.xml", 12, 7, 200);
        assert_eq!(loc.to_string(), "sun-ejb-jar.xml:12:7");
    }
}
