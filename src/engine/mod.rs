//! The markup-driven transformation engine.
//!
//! One pipeline, two modes. [`Mode::Transform`] extracts frames into hoisted
//! procedures plus residual code; [`Mode::Passthrough`] hides the markup and
//! leaves the script as it was. Each run owns its own state, so engines can be
//! used from several threads at once and re-running is side-effect free.

use serde::{Deserialize, Serialize};

use crate::{
    config::{EmitConfig, Settings},
    document::Document,
    errors::IimportError,
    markup::Dialect,
};

pub mod emitter;
pub mod filter;
pub mod frame;
pub mod passthrough;
pub mod result;
pub mod rewriter;
pub mod scanner;
pub mod scope;

pub use emitter::{EmitOrder, Emitter};
pub use frame::{FrameId, FrameKind, Procedure};
pub use passthrough::Passthrough;
pub use result::{ProcedureGroup, TransformResult};
pub use scanner::Transformer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Passthrough,
    Transform,
}

/// A compiled dialect plus emission settings.
#[derive(Debug, Clone)]
pub struct Engine {
    dialect: Dialect,
    emit: EmitConfig,
}

impl Engine {
    pub fn new(settings: &Settings) -> Result<Self, IimportError> {
        Ok(Self {
            dialect: Dialect::compile(&settings.dialect)?,
            emit: settings.emit.clone(),
        })
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn emit_config(&self) -> &EmitConfig {
        &self.emit
    }

    /// A fresh single-pass transformer for incremental use.
    pub fn transformer(&self) -> Transformer {
        Transformer::new(self.dialect.clone(), self.emit.clone())
    }

    /// Runs the full extraction. Fails atomically: no partial result.
    pub fn transform(&self, document: &Document) -> Result<TransformResult, IimportError> {
        let mut transformer = self.transformer();
        for line in document.lines() {
            transformer
                .step(line)
                .map_err(|kind| IimportError::located(kind, document))?;
        }
        let result = transformer
            .finish()
            .map_err(|kind| IimportError::located(kind, document))?;
        tracing::debug!(
            document = %document.name,
            procedures = result.procedures.len(),
            "transform finished"
        );
        Ok(result)
    }

    pub fn passthrough(&self, document: &Document) -> Vec<String> {
        passthrough::render(&self.dialect, document)
    }

    pub fn render(&self, result: &TransformResult) -> String {
        Emitter::new(&self.emit).render(result)
    }

    /// Runs either mode and returns program text.
    pub fn run(&self, mode: Mode, document: &Document) -> Result<String, IimportError> {
        match mode {
            Mode::Passthrough => {
                let mut text = self.passthrough(document).join("\n");
                text.push('\n');
                Ok(text)
            }
            Mode::Transform => self.transform(document).map(|r| self.render(&r)),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            emit: EmitConfig::default(),
        }
    }
}
