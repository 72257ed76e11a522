//! Importing documents by name.
//!
//! An import name resolves to a document file in one of the search paths;
//! the document is transformed by its own engine instance and handed to the
//! host as a [`Module`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    config::Settings,
    document::{DocumentSource, TextSource},
    engine::{Engine, TransformResult},
    errors::{ErrorKind, IimportError},
};

/// A transformed document, ready to be bound under an alias.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub alias: String,
    pub path: PathBuf,
    pub result: TransformResult,
    /// The full transformed program text.
    pub text: String,
}

impl Module {
    pub fn procedure_names(&self) -> Vec<String> {
        self.result.procedure_names().map(str::to_string).collect()
    }
}

/// Alias used when an import has no `as` clause.
pub fn default_alias(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, ',' | '.' | ' ' | '-') { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

// ============================================================================
// RESOLVER
// ============================================================================

#[derive(Debug, Clone)]
pub struct Resolver {
    search_paths: Vec<PathBuf>,
    extension: String,
}

impl Resolver {
    pub fn new(search_paths: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            search_paths,
            extension: extension.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.import.search_paths.clone(),
            settings.document.extension.clone(),
        )
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Every path tried for `name`, in order: the plain file name, then `_`
    /// spelled as `-`, then as a space.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let suffix = format!(".{}", self.extension);
        let suffix = suffix.as_str();
        let name = name.strip_suffix(suffix).unwrap_or(name);
        let stem = name.rsplit('.').next().unwrap_or(name);
        let mut spellings = vec![stem.to_string()];
        for replacement in ["-", " "] {
            let variant = stem.replace('_', replacement);
            if !spellings.contains(&variant) {
                spellings.push(variant);
            }
        }

        let dirs: Vec<&Path> = if self.search_paths.is_empty() {
            vec![Path::new(".")]
        } else {
            self.search_paths.iter().map(PathBuf::as_path).collect()
        };
        dirs.iter()
            .flat_map(|dir| {
                spellings
                    .iter()
                    .map(move |s| dir.join(format!("{s}{suffix}")))
            })
            .collect()
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf, IimportError> {
        let candidates = self.candidates(name);
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                ErrorKind::DocumentNotFound {
                    name: name.to_string(),
                    searched: candidates.iter().map(|p| p.display().to_string()).collect(),
                }
                .into()
            })
    }
}

// ============================================================================
// IMPORTER
// ============================================================================

pub struct Importer<S = TextSource> {
    engine: Engine,
    resolver: Resolver,
    source: S,
}

impl Importer<TextSource> {
    pub fn from_settings(settings: &Settings) -> Result<Self, IimportError> {
        Ok(Self::new(
            Engine::new(settings)?,
            Resolver::from_settings(settings),
            TextSource::new(settings.document.cell_separator.clone()),
        ))
    }
}

impl<S: DocumentSource> Importer<S> {
    pub fn new(engine: Engine, resolver: Resolver, source: S) -> Self {
        Self {
            engine,
            resolver,
            source,
        }
    }

    pub fn resolver_mut(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    /// Resolves, loads and transforms `name`.
    pub fn import(&self, name: &str, alias: Option<&str>) -> Result<Module, IimportError> {
        let path = self.resolver.resolve(name)?;
        tracing::info!(name, path = %path.display(), "importing document");
        let document = self.source.load(&path)?;
        let result = self.engine.transform(&document)?;
        let text = self.engine.render(&result);
        Ok(Module {
            alias: alias.map_or_else(|| default_alias(name), str::to_string),
            path,
            result,
            text,
        })
    }
}

/// One-shot import with a fresh engine built from `settings`.
pub fn import_document(
    settings: &Settings,
    name: &str,
    alias: Option<&str>,
) -> Result<Module, IimportError> {
    Importer::from_settings(settings)?.import(name, alias)
}
