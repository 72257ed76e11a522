//! Settings for the engine, the emitter, document loading and import resolution.
//!
//! Everything has a default, so an empty YAML file (or no file at all) gives
//! the stock `%def` / `%end` dialect with Python-style emission.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    engine::EmitOrder,
    errors::{ErrorKind, IimportError},
    markup::Tag,
};

/// File picked up from the working directory by [`Settings::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "iimport.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub dialect: DialectConfig,
    pub emit: EmitConfig,
    pub document: DocumentConfig,
    pub import: ImportConfig,
}

/// The one markup dialect in effect.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialectConfig {
    /// Character(s) introducing a tag, `%` by default.
    pub sigil: String,
    /// Line comment marker of the target language, used in passthrough.
    pub comment: String,
    /// Tag spelling to meaning.
    pub tags: BTreeMap<String, Tag>,
}

impl Default for DialectConfig {
    fn default() -> Self {
        let tags = [
            ("<", Tag::DefineBegin),
            ("def", Tag::DefineBegin),
            (">", Tag::DefineEnd),
            ("end", Tag::DefineEnd),
            ("-", Tag::SkipLine),
            ("//", Tag::SkipLine),
            ("/*", Tag::SkipBlockBegin),
            ("*/", Tag::SkipBlockEnd),
            ("example", Tag::ExampleBegin),
            ("ex", Tag::ExampleBegin),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            sigil: "%".into(),
            comment: "#".into(),
            tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmitConfig {
    /// One level of indentation in emitted procedures.
    pub indent: String,
    pub docstrings: bool,
    pub order: EmitOrder,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent: "    ".into(),
            docstrings: true,
            order: EmitOrder::ProceduresFirst,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Extension appended to import names, without the dot.
    pub extension: String,
    pub cell_separator: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            extension: "py".into(),
            cell_separator: "# %%".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImportConfig {
    pub search_paths: Vec<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from(".")],
        }
    }
}

impl Settings {
    pub fn from_yaml(source: &str) -> Result<Self, IimportError> {
        let settings: Settings = serde_yaml::from_str(source).map_err(|e| ErrorKind::Config {
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IimportError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| ErrorKind::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&source)
    }

    /// Loads `iimport.yaml` from the working directory, or the defaults.
    pub fn discover() -> Result<Self, IimportError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            tracing::debug!("loading settings from {}", path.display());
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), IimportError> {
        let invalid = |reason: String| -> Result<(), IimportError> {
            Err(ErrorKind::Config { reason }.into())
        };
        if self.dialect.sigil.is_empty() || self.dialect.sigil.chars().any(char::is_whitespace) {
            return invalid(format!("bad sigil {:?}", self.dialect.sigil));
        }
        if self.dialect.tags.is_empty() {
            return invalid("the dialect declares no tags".into());
        }
        if let Some(bad) = self
            .dialect
            .tags
            .keys()
            .find(|t| t.is_empty() || !t.chars().all(crate::markup::is_tag_char))
        {
            return invalid(format!("tag {bad:?} uses characters outside [A-Za-z+-\\/<>*]"));
        }
        if self.emit.indent.is_empty() || !self.emit.indent.chars().all(|c| c == ' ' || c == '\t')
        {
            return invalid("emit.indent must be spaces or tabs".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let settings = Settings::from_yaml("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.dialect.tags.get("def"), Some(&Tag::DefineBegin));
    }

    #[test]
    fn partial_yaml_overrides_fields() {
        let yaml = "emit:\n  docstrings: false\n  order: interleaved\ndocument:\n  extension: txt\n";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert!(!settings.emit.docstrings);
        assert_eq!(settings.emit.order, EmitOrder::Interleaved);
        assert_eq!(settings.emit.indent, "    ");
        assert_eq!(settings.document.extension, "txt");
    }

    #[test]
    fn custom_dialect_replaces_tag_table() {
        let yaml = "dialect:\n  sigil: '@'\n  tags:\n    proc: define-begin\n    done: define-end\n";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.dialect.sigil, "@");
        assert_eq!(settings.dialect.tags.len(), 2);
        assert_eq!(settings.dialect.comment, "#");
    }

    #[test]
    fn rejects_bad_tag_spelling() {
        let yaml = "dialect:\n  tags:\n    'de f': define-begin\n";
        let err = Settings::from_yaml(yaml).unwrap_err();
        assert_eq!(err.kind().code_suffix(), "config");
    }

    #[test]
    fn rejects_non_whitespace_indent() {
        let err = Settings::from_yaml("emit:\n  indent: '->'\n").unwrap_err();
        assert!(err.to_string().contains("emit.indent"));
    }
}
