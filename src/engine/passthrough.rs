//! Passthrough rendering: markup becomes invisible and nothing is extracted.
//!
//! One output line per input line, so line numbers survive. Skip-line tags
//! lose their prefix, structural tags turn into comments, and skip block
//! interiors are copied verbatim. Nothing here can fail.

use crate::{
    document::{Document, SourceLine},
    markup::{Dialect, Tag},
};

use super::filter::ExclusionFilter;

/// Block state carried from line to line (and cell to cell).
#[derive(Debug, Clone, Default)]
pub struct Passthrough {
    filter: ExclusionFilter,
}

impl Passthrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_line(&mut self, dialect: &Dialect, source: &SourceLine) -> String {
        if self.filter.in_block() {
            let closes = dialect.is_block_end(&source.text);
            self.filter.absorb(dialect, source);
            return if closes {
                dialect.comment_out(&source.text)
            } else {
                source.text.clone()
            };
        }
        match dialect.match_tag(&source.text) {
            None => source.text.clone(),
            Some(found) if found.tag == Tag::SkipLine => format!("{}{}", found.indent, found.payload),
            Some(found) => {
                if found.tag == Tag::SkipBlockBegin {
                    self.filter.open_block(source.coord);
                }
                dialect.comment_out(&source.text)
            }
        }
    }
}

/// Renders a whole document in passthrough mode.
pub fn render(dialect: &Dialect, document: &Document) -> Vec<String> {
    let mut state = Passthrough::new();
    document
        .lines()
        .iter()
        .map(|line| state.render_line(dialect, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(source: &str) -> Vec<String> {
        render(Dialect::standard(), &Document::from_source("t", source))
    }

    #[test]
    fn code_and_skip_lines_survive() {
        let out = pass("x = 1\n%- print(x)\n    %// plot(x)");
        assert_eq!(out, vec!["x = 1", "print(x)", "    plot(x)"]);
    }

    #[test]
    fn structural_tags_become_comments() {
        let out = pass("%def f(a) -> b\nb = a\n%end");
        assert_eq!(out, vec!["# %def f(a) -> b", "b = a", "# %end"]);
    }

    #[test]
    fn block_interior_is_verbatim() {
        let out = pass("%/*\n%def g() -> h\nh = 1\n%*/\nz = 2");
        assert_eq!(out, vec!["# %/*", "%def g() -> h", "h = 1", "# %*/", "z = 2"]);
    }

    #[test]
    fn malformed_header_is_just_a_comment() {
        assert_eq!(pass("%def broken((")[0], "# %def broken((");
    }
}
