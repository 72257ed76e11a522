//! Line classification: raw line in, token kind plus structured fields out.

use crate::{
    document::{Coord, SourceLine},
    errors::ErrorKind,
};

use super::{
    header::{self, Header, HeaderError},
    Dialect, Tag,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Code,
    DefineBegin(Header),
    DefineEnd,
    SkipLine,
    SkipBlockBegin,
    SkipBlockEnd,
    /// An example frame, optionally named.
    ExampleBegin(Option<String>),
}

/// A classified line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub coord: Coord,
    /// The line exactly as it appeared in the document.
    pub raw: String,
    /// Leading whitespace before the tag, empty for code lines.
    pub indent: String,
    /// Text after the tag, or the whole line for code.
    pub payload: String,
    pub kind: TokenKind,
}

impl Line {
    /// The line with its tag prefix removed and indentation kept.
    pub fn untagged(&self) -> String {
        match self.kind {
            TokenKind::Code => self.raw.clone(),
            _ => format!("{}{}", self.indent, self.payload),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier<'d> {
    dialect: &'d Dialect,
}

impl<'d> Classifier<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'d Dialect {
        self.dialect
    }

    /// Classifies one line. Only a malformed header can fail.
    pub fn classify(&self, source: &SourceLine) -> Result<Line, ErrorKind> {
        let Some(found) = self.dialect.match_tag(&source.text) else {
            return Ok(Line {
                coord: source.coord,
                raw: source.text.clone(),
                indent: String::new(),
                payload: source.text.clone(),
                kind: TokenKind::Code,
            });
        };
        tracing::debug!(at = %source.coord, tag = ?found.tag, "found tag");

        let malformed = |e: HeaderError| ErrorKind::MalformedHeader {
            at: source.coord,
            text: source.text.clone(),
            reason: format!("{} (column {})", e.reason, e.column + 1),
        };
        let kind = match found.tag {
            Tag::DefineBegin => {
                TokenKind::DefineBegin(header::parse_header(found.payload).map_err(malformed)?)
            }
            Tag::ExampleBegin => TokenKind::ExampleBegin(
                header::parse_example_name(found.payload).map_err(malformed)?,
            ),
            Tag::DefineEnd => TokenKind::DefineEnd,
            Tag::SkipLine => TokenKind::SkipLine,
            Tag::SkipBlockBegin => TokenKind::SkipBlockBegin,
            Tag::SkipBlockEnd => TokenKind::SkipBlockEnd,
        };
        Ok(Line {
            coord: source.coord,
            raw: source.text.clone(),
            indent: found.indent.to_string(),
            payload: found.payload.to_string(),
            kind,
        })
    }
}
