//! Exclusion filter: single-line skips and skip blocks.
//!
//! Inside a skip block nothing is classified. The only question asked of a
//! line is whether it closes the block, so frame tags in there are inert.

use crate::{
    document::{Coord, SourceLine},
    errors::ErrorKind,
    markup::{Dialect, Line, TokenKind},
};

#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    block_opened_at: Option<Coord>,
}

impl ExclusionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_block(&self) -> bool {
        self.block_opened_at.is_some()
    }

    /// Consumes `source` if a skip block is open. Returns true when the line
    /// belonged to the block (its closing tag included).
    pub fn absorb(&mut self, dialect: &Dialect, source: &SourceLine) -> bool {
        if !self.in_block() {
            return false;
        }
        if dialect.is_block_end(&source.text) {
            tracing::debug!(at = %source.coord, "skip block closed");
            self.block_opened_at = None;
        }
        true
    }

    /// Decides whether a classified line is excluded from transform output.
    /// Opens a block on a block-begin tag.
    pub fn excludes(&mut self, line: &Line) -> bool {
        match line.kind {
            TokenKind::SkipLine => true,
            TokenKind::SkipBlockBegin => {
                self.open_block(line.coord);
                true
            }
            TokenKind::SkipBlockEnd => {
                tracing::debug!(at = %line.coord, "stray skip block end ignored");
                true
            }
            _ => false,
        }
    }

    pub fn open_block(&mut self, at: Coord) {
        tracing::debug!(%at, "skip block opened");
        self.block_opened_at = Some(at);
    }

    pub fn ensure_closed(&self) -> Result<(), ErrorKind> {
        match self.block_opened_at {
            Some(at) => Err(ErrorKind::UnterminatedSkipBlock { at }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::Document, markup::Classifier};

    #[test]
    fn block_swallows_frame_tags() {
        let doc = Document::from_source("t", "%/*\n%def f(x) -> y\n%*/\nz = 1");
        let dialect = Dialect::standard();
        let classifier = Classifier::new(dialect);
        let mut filter = ExclusionFilter::new();

        let first = classifier.classify(&doc.lines()[0]).unwrap();
        assert!(filter.excludes(&first));
        assert!(filter.in_block());
        assert!(filter.absorb(dialect, &doc.lines()[1]));
        assert!(filter.in_block());
        assert!(filter.absorb(dialect, &doc.lines()[2]));
        assert!(!filter.in_block());
        assert!(!filter.absorb(dialect, &doc.lines()[3]));
        assert!(filter.ensure_closed().is_ok());
    }

    #[test]
    fn end_tags_are_inert_inside_a_block() {
        let doc = Document::from_cells("t", ["%/*\n%end", "%>\n%*/"]);
        let dialect = Dialect::standard();
        let mut filter = ExclusionFilter::new();
        filter.open_block(doc.lines()[0].coord);
        assert!(filter.absorb(dialect, &doc.lines()[1]));
        assert!(filter.absorb(dialect, &doc.lines()[2]));
        assert!(filter.in_block());
        assert!(filter.absorb(dialect, &doc.lines()[3]));
        assert!(!filter.in_block());
    }

    #[test]
    fn unterminated_block_is_reported() {
        let mut filter = ExclusionFilter::new();
        filter.open_block(Coord::new(1, 2));
        assert_eq!(
            filter.ensure_closed(),
            Err(ErrorKind::UnterminatedSkipBlock {
                at: Coord::new(1, 2)
            })
        );
    }
}
