//! iimport error handling.
//!
//! Every failure the engine can detect is an [`ErrorKind`]. When a document is
//! at hand the error also carries the flattened document text and the span of
//! the offending line, so `miette` can point the author at the exact source line.

use std::{fmt, sync::Arc};

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

use crate::document::{Coord, Document, SourceLine};

// ============================================================================
// ERROR KINDS
// ============================================================================

/// A frame that was still open when the input ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFrame {
    pub name: String,
    pub at: Coord,
}

impl fmt::Display for OpenFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.name, self.at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("malformed procedure header at {at}: {reason}")]
    MalformedHeader {
        at: Coord,
        text: String,
        reason: String,
    },

    #[error("duplicate procedure name '{name}' at {at} (first declared at {first})")]
    DuplicateName { name: String, at: Coord, first: Coord },

    #[error("end of procedure at {at} with no open procedure")]
    UnmatchedEnd { at: Coord },

    #[error("unterminated procedure definition: {}", join_frames(.open))]
    UnterminatedDefinition { open: Vec<OpenFrame> },

    #[error("skip block opened at {at} is never closed")]
    UnterminatedSkipBlock { at: Coord },

    #[error("document '{name}' not found")]
    DocumentNotFound { name: String, searched: Vec<String> },

    #[error("invalid command '{command}': {reason}")]
    InvalidCommand { command: String, reason: String },

    #[error("cannot read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("cannot serialize output: {reason}")]
    Output { reason: String },
}

fn join_frames(open: &[OpenFrame]) -> String {
    open.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ErrorKind {
    /// Suffix used for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MalformedHeader { .. } => "malformed_header",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::UnmatchedEnd { .. } => "unmatched_end",
            Self::UnterminatedDefinition { .. } => "unterminated_definition",
            Self::UnterminatedSkipBlock { .. } => "unterminated_skip_block",
            Self::DocumentNotFound { .. } => "document_not_found",
            Self::InvalidCommand { .. } => "invalid_command",
            Self::Io { .. } => "io",
            Self::Config { .. } => "config",
            Self::Output { .. } => "output",
        }
    }

    /// True for failures detected while scanning markup.
    pub fn is_markup(&self) -> bool {
        matches!(
            self,
            Self::MalformedHeader { .. }
                | Self::DuplicateName { .. }
                | Self::UnmatchedEnd { .. }
                | Self::UnterminatedDefinition { .. }
                | Self::UnterminatedSkipBlock { .. }
        )
    }

    fn primary_label(&self) -> String {
        match self {
            Self::MalformedHeader { reason, .. } => reason.clone(),
            Self::DuplicateName { .. } => "declared again here".into(),
            Self::UnmatchedEnd { .. } => "nothing to close".into(),
            Self::UnterminatedDefinition { .. } => "never closed".into(),
            Self::UnterminatedSkipBlock { .. } => "skip block starts here".into(),
            _ => "here".into(),
        }
    }

    fn help(&self) -> Option<String> {
        match self {
            Self::UnterminatedDefinition { .. } => {
                Some("add a `%end` line after the last line of the procedure".into())
            }
            Self::UnterminatedSkipBlock { .. } => Some("close the block with `%*/`".into()),
            Self::UnmatchedEnd { .. } => Some("remove the `%end` line or add a header".into()),
            Self::MalformedHeader { .. } => {
                Some("headers look like `%def name(a, b=1) -> result`".into())
            }
            Self::DocumentNotFound { searched, .. } if !searched.is_empty() => {
                Some(format!("searched: {}", searched.join(", ")))
            }
            _ => None,
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Where an error happened.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub related: Vec<(SourceSpan, String)>,
}

#[derive(Debug)]
pub struct IimportError {
    pub kind: ErrorKind,
    pub source_info: Option<SourceInfo>,
    pub help: Option<String>,
}

impl IimportError {
    pub fn new(kind: ErrorKind) -> Self {
        let help = kind.help();
        Self {
            kind,
            source_info: None,
            help,
        }
    }

    /// Attaches the document text and the span of the failing line(s).
    pub fn located(kind: ErrorKind, document: &Document) -> Self {
        let mut error = Self::new(kind);
        let lookup = |coord: Coord| document.line_at(coord).map(SourceLine::span);
        let (primary, related) = match &error.kind {
            ErrorKind::MalformedHeader { at, .. }
            | ErrorKind::UnmatchedEnd { at }
            | ErrorKind::UnterminatedSkipBlock { at } => (lookup(*at), Vec::new()),
            ErrorKind::DuplicateName { at, first, .. } => (
                lookup(*at),
                lookup(*first)
                    .map(|s| vec![(s, "first declared here".to_string())])
                    .unwrap_or_default(),
            ),
            ErrorKind::UnterminatedDefinition { open } => {
                let mut spans = open.iter().filter_map(|f| {
                    lookup(f.at).map(|s| (s, format!("'{}' opened here", f.name)))
                });
                (spans.next().map(|(s, _)| s), spans.collect())
            }
            _ => (None, Vec::new()),
        };
        if let Some(primary_span) = primary {
            error.source_info = Some(SourceInfo {
                source: document.to_named_source(),
                primary_span,
                related,
            });
        }
        error
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl From<ErrorKind> for IimportError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl std::error::Error for IimportError {}

impl fmt::Display for IimportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for IimportError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("iimport::{}", self.kind.code_suffix())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let info = self.source_info.as_ref()?;
        let mut labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label()),
            info.primary_span,
        )];
        labels.extend(
            info.related
                .iter()
                .map(|(span, label)| LabeledSpan::new_with_span(Some(label.clone()), *span)),
        );
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_info
            .as_ref()
            .map(|info| &*info.source as &dyn miette::SourceCode)
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: IimportError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn located_error_labels_the_line() {
        let doc = Document::from_cells("nb", ["x = 1", "%end"]);
        let err = IimportError::located(
            ErrorKind::UnmatchedEnd {
                at: Coord::new(1, 0),
            },
            &doc,
        );
        let info = err.source_info.as_ref().unwrap();
        assert_eq!(info.primary_span.offset(), 6);
        let report = format!("{:?}", miette::Report::new(err));
        assert!(report.contains("iimport::unmatched_end"));
        assert!(report.contains("nothing to close"));
    }

    #[test]
    fn unterminated_definition_lists_every_frame() {
        let doc = Document::from_source("nb", "%def a() -> x\n%def b() -> y\ny = 1");
        let kind = ErrorKind::UnterminatedDefinition {
            open: vec![
                OpenFrame {
                    name: "a".into(),
                    at: Coord::new(0, 0),
                },
                OpenFrame {
                    name: "b".into(),
                    at: Coord::new(0, 1),
                },
            ],
        };
        assert_eq!(
            kind.to_string(),
            "unterminated procedure definition: 'a' (cell 1, line 1), 'b' (cell 1, line 2)"
        );
        let err = IimportError::located(kind, &doc);
        assert_eq!(err.source_info.as_ref().unwrap().related.len(), 1);
        let report = format!("{:?}", miette::Report::new(err));
        assert!(report.contains("'b' opened here"));
    }

    #[test]
    fn errors_without_document_have_no_labels() {
        let err = IimportError::new(ErrorKind::Config {
            reason: "bad".into(),
        });
        assert!(err.labels().is_none());
        assert_eq!(err.to_string(), "invalid configuration: bad");
    }
}
