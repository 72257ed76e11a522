//! Markup recognition: the tag dialect, procedure headers and line classification.
//!
//! A tag is a line prefix: optional indentation, the dialect's sigil, then a
//! maximal run of tag characters. Only spellings listed in the dialect count;
//! anything else (`%matplotlib inline`, `%%time`) is ordinary code.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    config::DialectConfig,
    errors::{ErrorKind, IimportError},
};

pub mod classifier;
pub mod header;

pub use classifier::{Classifier, Line, TokenKind};
pub use header::{parse_header, Header, ParameterSpec};

/// What a recognized tag means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    DefineBegin,
    DefineEnd,
    SkipLine,
    SkipBlockBegin,
    SkipBlockEnd,
    ExampleBegin,
}

impl Tag {
    /// Tags that shape frames or skip blocks, as opposed to per-line skips.
    pub fn is_structural(self) -> bool {
        !matches!(self, Tag::SkipLine)
    }
}

pub fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '+' | '-' | '\\' | '/' | '<' | '>' | '*')
}

/// A tag found at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch<'a> {
    pub tag: Tag,
    /// Leading whitespace before the sigil.
    pub indent: &'a str,
    /// The tag prefix itself, sigil and trailing blanks included.
    pub prefix: &'a str,
    /// Everything after the prefix.
    pub payload: &'a str,
}

/// A compiled markup dialect.
#[derive(Debug, Clone)]
pub struct Dialect {
    pattern: Regex,
    tags: BTreeMap<String, Tag>,
    comment: String,
}

static DEFAULT_DIALECT: Lazy<Dialect> = Lazy::new(|| {
    // The stock table only uses tag characters and a plain sigil.
    Dialect::compile(&DialectConfig::default()).expect("default dialect compiles")
});

impl Dialect {
    pub fn compile(config: &DialectConfig) -> Result<Self, IimportError> {
        let source = format!(
            r"^(?P<indent>[ \t]*){}(?P<tag>[A-Za-z+\-\\/<>*]+)[ \t]*",
            regex::escape(&config.sigil)
        );
        let pattern = Regex::new(&source).map_err(|e| ErrorKind::Config {
            reason: format!("cannot build tag pattern: {e}"),
        })?;
        Ok(Self {
            pattern,
            tags: config.tags.clone(),
            comment: config.comment.clone(),
        })
    }

    /// The stock `%`-dialect.
    pub fn standard() -> &'static Dialect {
        &DEFAULT_DIALECT
    }

    /// Looks for a known tag at the start of `text`. Never fails.
    pub fn match_tag<'a>(&self, text: &'a str) -> Option<TagMatch<'a>> {
        let caps = self.pattern.captures(text)?;
        let tag = *self.tags.get(caps.name("tag")?.as_str())?;
        let indent = caps.name("indent")?.as_str();
        let end = caps.get(0)?.end();
        Some(TagMatch {
            tag,
            indent,
            prefix: &text[indent.len()..end],
            payload: &text[end..],
        })
    }

    /// True if `text` closes a skip block. The only question asked inside one.
    pub fn is_block_end(&self, text: &str) -> bool {
        self.match_tag(text)
            .is_some_and(|m| m.tag == Tag::SkipBlockEnd)
    }

    /// Renders a tag line as a comment of the target language.
    pub fn comment_out(&self, text: &str) -> String {
        let body = text.trim_start_matches([' ', '\t']);
        let indent = &text[..text.len() - body.len()];
        format!("{indent}{} {body}", self.comment)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_aliases() {
        let d = Dialect::standard();
        assert_eq!(d.match_tag("%def f(x) -> y").unwrap().tag, Tag::DefineBegin);
        assert_eq!(d.match_tag("%< f(x) -> y").unwrap().tag, Tag::DefineBegin);
        assert_eq!(d.match_tag("%>").unwrap().tag, Tag::DefineEnd);
        assert_eq!(d.match_tag("%end").unwrap().tag, Tag::DefineEnd);
        assert_eq!(d.match_tag("%- df.info()").unwrap().tag, Tag::SkipLine);
        assert_eq!(d.match_tag("%// plot()").unwrap().tag, Tag::SkipLine);
        assert_eq!(d.match_tag("%/*").unwrap().tag, Tag::SkipBlockBegin);
        assert_eq!(d.match_tag("%*/").unwrap().tag, Tag::SkipBlockEnd);
        assert_eq!(d.match_tag("%example demo").unwrap().tag, Tag::ExampleBegin);
    }

    #[test]
    fn splits_indent_prefix_and_payload() {
        let m = Dialect::standard().match_tag("    %-  print(x)").unwrap();
        assert_eq!(m.indent, "    ");
        assert_eq!(m.prefix, "%-  ");
        assert_eq!(m.payload, "print(x)");
    }

    #[test]
    fn unknown_tags_are_code() {
        let d = Dialect::standard();
        assert!(d.match_tag("%matplotlib inline").is_none());
        assert!(d.match_tag("%%time").is_none());
        assert!(d.match_tag("x = 5 % 2").is_none());
        // Maximal munch: `-df` is not `-`.
        assert!(d.match_tag("%-df.info()").is_none());
    }

    #[test]
    fn custom_sigil_is_escaped() {
        let config = DialectConfig {
            sigil: "#!".into(),
            ..DialectConfig::default()
        };
        let d = Dialect::compile(&config).unwrap();
        assert_eq!(d.match_tag("#!end").unwrap().tag, Tag::DefineEnd);
        assert!(d.match_tag("%end").is_none());
    }

    #[test]
    fn comment_out_keeps_indentation() {
        assert_eq!(
            Dialect::standard().comment_out("  %def f() -> x"),
            "  # %def f() -> x"
        );
    }
}
