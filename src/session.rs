//! Interactive sessions.
//!
//! A session takes cells one at a time from a host and keeps block and frame
//! state between them. Its flags are plain fields owned by whoever owns the
//! session; two sessions never see each other's state.

use crate::{
    config::Settings,
    document::{Coord, DocumentSource, SourceLine, TextSource},
    engine::{Engine, Passthrough, Transformer},
    errors::{ErrorKind, IimportError},
    import::{Importer, Module},
};

/// The host side of a session: it owns evaluation and the namespace.
pub trait Host {
    fn bind(&mut self, alias: &str, module: Module);
}

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enable(bool),
    Debug(bool),
    Import { name: String, alias: Option<String> },
}

impl Command {
    /// Parses a command line. `None` means the line is not an iimport command.
    pub fn parse(line: &str) -> Option<Result<Command, ErrorKind>> {
        let mut words = line.split_whitespace();
        let head = words.next()?;
        if !head.starts_with("%iimport") {
            return None;
        }
        let args: Vec<&str> = words.collect();
        let invalid = |reason: &str| ErrorKind::InvalidCommand {
            command: line.trim().to_string(),
            reason: reason.to_string(),
        };
        let parsed = match head {
            "%iimport_enabled" => parse_flag(&args).map(Command::Enable).ok_or_else(|| invalid("expected 0 or 1")),
            "%iimport_debug" => parse_flag(&args).map(Command::Debug).ok_or_else(|| invalid("expected 0 or 1")),
            "%iimport" => match args.as_slice() {
                [name] => Ok(Command::Import {
                    name: name.to_string(),
                    alias: None,
                }),
                [name, "as", alias] => Ok(Command::Import {
                    name: name.to_string(),
                    alias: Some(alias.to_string()),
                }),
                _ => Err(invalid("usage: %iimport <name> [as <alias>]")),
            },
            _ => Err(invalid("unknown command")),
        };
        Some(parsed)
    }
}

fn parse_flag(args: &[&str]) -> Option<bool> {
    match args {
        ["1"] => Some(true),
        ["0"] => Some(false),
        _ => None,
    }
}

/// What a dispatched line did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    NotACommand,
    Enabled(bool),
    Debug(bool),
    /// The module was bound in the host under `alias`.
    Imported {
        alias: String,
        procedures: Vec<String>,
    },
    /// Debug mode: the transformed text, nothing bound.
    Inspect { alias: String, text: String },
}

/// The result of [`Session::execute_cell`].
#[derive(Debug)]
pub struct CellRun {
    /// Rendered code lines, command lines left out.
    pub text: String,
    /// One outcome per command line, in order.
    pub dispatched: Vec<Result<Dispatch, IimportError>>,
}

// ============================================================================
// SESSION
// ============================================================================

pub struct Session<S = TextSource> {
    engine: Engine,
    importer: Importer<S>,
    enabled: bool,
    debug: bool,
    passthrough: Passthrough,
    extractor: Transformer,
    cell: usize,
}

impl Session<TextSource> {
    pub fn new(settings: &Settings) -> Result<Self, IimportError> {
        Ok(Self::with_importer(
            Engine::new(settings)?,
            Importer::from_settings(settings)?,
        ))
    }
}

impl<S: DocumentSource> Session<S> {
    pub fn with_importer(engine: Engine, importer: Importer<S>) -> Self {
        let extractor = engine.transformer();
        Self {
            engine,
            importer,
            enabled: false,
            debug: false,
            passthrough: Passthrough::new(),
            extractor,
            cell: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Turning extraction on starts from a clean frame stack.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.extractor = self.engine.transformer();
        }
        self.enabled = enabled;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Renders one cell for the host to evaluate.
    pub fn run_cell(&mut self, source: &str) -> String {
        let mut out = Vec::new();
        for (index, text) in source.split('\n').enumerate() {
            self.render_line(index, text, &mut out);
        }
        self.finish_cell(out)
    }

    /// Like [`Session::run_cell`], but command lines are dispatched where they
    /// stand instead of being rendered. A failing command does not stop the cell.
    pub fn execute_cell(&mut self, source: &str, host: &mut dyn Host) -> CellRun {
        let mut out = Vec::new();
        let mut dispatched = Vec::new();
        for (index, text) in source.split('\n').enumerate() {
            if Command::parse(text).is_some() {
                let outcome = self.dispatch(text, host);
                if let Err(error) = &outcome {
                    tracing::warn!(%error, "command failed");
                }
                dispatched.push(outcome);
                continue;
            }
            self.render_line(index, text, &mut out);
        }
        CellRun {
            text: self.finish_cell(out),
            dispatched,
        }
    }

    /// Handles `%iimport...` command lines.
    pub fn dispatch(&mut self, line: &str, host: &mut dyn Host) -> Result<Dispatch, IimportError> {
        let command = match Command::parse(line) {
            None => return Ok(Dispatch::NotACommand),
            Some(parsed) => parsed?,
        };
        match command {
            Command::Enable(on) => {
                self.set_enabled(on);
                Ok(Dispatch::Enabled(on))
            }
            Command::Debug(on) => {
                self.set_debug(on);
                Ok(Dispatch::Debug(on))
            }
            Command::Import { name, alias } => {
                let module = self.importer.import(&name, alias.as_deref())?;
                if self.debug {
                    return Ok(Dispatch::Inspect {
                        alias: module.alias,
                        text: module.text,
                    });
                }
                let alias = module.alias.clone();
                let procedures = module.procedure_names();
                host.bind(&alias, module);
                Ok(Dispatch::Imported { alias, procedures })
            }
        }
    }

    fn render_line(&mut self, index: usize, text: &str, out: &mut Vec<String>) {
        let line = SourceLine {
            coord: Coord::new(self.cell, index),
            text: text.to_string(),
            offset: 0,
        };
        out.push(self.passthrough.render_line(self.engine.dialect(), &line));
        if self.enabled {
            self.extract(&line, out);
        }
    }

    fn finish_cell(&mut self, out: Vec<String>) -> String {
        self.cell += 1;
        tracing::debug!(cell = self.cell, lines = out.len(), "cell rendered");
        out.join("\n")
    }

    fn extract(&mut self, line: &SourceLine, out: &mut Vec<String>) {
        match self.extractor.step(line) {
            Ok(Some(index)) => {
                if let Some(procedure) = self.extractor.procedure(index) {
                    let indent: String = line
                        .text
                        .chars()
                        .take_while(|c| *c == ' ' || *c == '\t')
                        .collect();
                    out.extend(
                        procedure
                            .lines(&self.engine.emit_config().indent)
                            .into_iter()
                            .map(|l| if l.is_empty() { l } else { format!("{indent}{l}") }),
                    );
                }
            }
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, at = %line.coord, "markup ignored"),
        }
        // Nothing open: forget finished names so a re-run cell declares them again.
        if self.extractor.is_idle() {
            self.extractor = self.engine.transformer();
        }
    }
}
