//! Documents as the engine sees them: an ordered, flattened sequence of lines.
//!
//! Cell boundaries are kept only as metadata on each line. A frame may open in
//! one cell and close several cells later, so nothing downstream ever treats a
//! cell boundary as structure.

use std::{fmt, fs, path::Path, sync::Arc};

use miette::{NamedSource, SourceSpan};
use serde::Serialize;

use crate::errors::{ErrorKind, IimportError};

// ============================================================================
// COORDINATES
// ============================================================================

/// Zero-based position of a line inside a document. Displayed 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Coord {
    pub cell: usize,
    pub line: usize,
}

impl Coord {
    pub fn new(cell: usize, line: usize) -> Self {
        Self { cell, line }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}, line {}", self.cell + 1, self.line + 1)
    }
}

/// A raw line together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub coord: Coord,
    pub text: String,
    /// Byte offset of the line inside [`Document::text`].
    pub offset: usize,
}

impl SourceLine {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.text.len())
    }
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// A flattened document: every line of every cell, in order.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    lines: Vec<SourceLine>,
    text: String,
}

impl Document {
    /// Builds a document from cell sources. Each cell is split on `\n`.
    pub fn from_cells<I, S>(name: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = Vec::new();
        let mut text = String::new();
        for (cell, source) in cells.into_iter().enumerate() {
            for (line, raw) in source.as_ref().split('\n').enumerate() {
                if !text.is_empty() || !lines.is_empty() {
                    text.push('\n');
                }
                let raw = raw.strip_suffix('\r').unwrap_or(raw);
                lines.push(SourceLine {
                    coord: Coord::new(cell, line),
                    text: raw.to_string(),
                    offset: text.len(),
                });
                text.push_str(raw);
            }
        }
        Self {
            name: name.into(),
            lines,
            text,
        }
    }

    /// A single-cell document.
    pub fn from_source(name: impl Into<String>, source: &str) -> Self {
        Self::from_cells(name, [source])
    }

    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// The flattened text, lines joined by `\n`.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cell_count(&self) -> usize {
        self.lines.last().map_or(0, |l| l.coord.cell + 1)
    }

    pub fn line_at(&self, coord: Coord) -> Option<&SourceLine> {
        self.lines.iter().find(|l| l.coord == coord)
    }

    /// Groups lines back into cells, as the interactive session consumes them.
    pub fn cells(&self) -> Vec<Vec<&SourceLine>> {
        let mut cells: Vec<Vec<&SourceLine>> = Vec::new();
        for line in &self.lines {
            if cells.len() <= line.coord.cell {
                cells.resize_with(line.coord.cell + 1, Vec::new);
            }
            cells[line.coord.cell].push(line);
        }
        cells
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.text.clone()))
    }
}

// ============================================================================
// DOCUMENT SOURCES
// ============================================================================

/// Anything that can produce a document from a path. Re-reading the same
/// path must yield the same lines.
pub trait DocumentSource {
    fn load(&self, path: &Path) -> Result<Document, IimportError>;
}

/// Plain UTF-8 scripts whose cells are delimited by a separator line.
#[derive(Debug, Clone)]
pub struct TextSource {
    pub cell_separator: String,
}

impl TextSource {
    pub fn new(cell_separator: impl Into<String>) -> Self {
        Self {
            cell_separator: cell_separator.into(),
        }
    }

    /// Splits source text into cells. Separator lines themselves are dropped.
    pub fn split_cells(&self, source: &str) -> Vec<String> {
        let mut cells = vec![Vec::new()];
        for line in source.lines() {
            if !self.cell_separator.is_empty() && line.trim_end() == self.cell_separator {
                cells.push(Vec::new());
                continue;
            }
            if let Some(cell) = cells.last_mut() {
                cell.push(line);
            }
        }
        if cells.len() > 1 && cells[0].is_empty() {
            cells.remove(0);
        }
        cells.into_iter().map(|c| c.join("\n")).collect()
    }

    pub fn parse(&self, name: impl Into<String>, source: &str) -> Document {
        Document::from_cells(name, self.split_cells(source))
    }
}

impl Default for TextSource {
    fn default() -> Self {
        Self::new("# %%")
    }
}

impl DocumentSource for TextSource {
    fn load(&self, path: &Path) -> Result<Document, IimportError> {
        let source = fs::read_to_string(path).map_err(|e| {
            IimportError::new(ErrorKind::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(self.parse(path.display().to_string(), &source))
    }
}
