pub use crate::errors::{ErrorKind, IimportError};

pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod errors;
pub mod import;
pub mod markup;
pub mod session;

pub use crate::config::Settings;
pub use crate::document::{Coord, Document, DocumentSource, TextSource};
pub use crate::engine::{Engine, Mode, TransformResult};
pub use crate::import::{Importer, Module};
pub use crate::session::{CellRun, Dispatch, Host, Session};
