//! Serializes a transform result as program text.

use serde::{Deserialize, Serialize};

use crate::config::EmitConfig;

use super::{frame::Procedure, result::TransformResult};

/// Where hoisted procedures go relative to the residual code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitOrder {
    /// Every procedure first, then the residual code.
    #[default]
    ProceduresFirst,
    /// Each top-level group right before the line where its frame stood.
    Interleaved,
}

#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    config: &'a EmitConfig,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a EmitConfig) -> Self {
        Self { config }
    }

    pub fn procedure(&self, procedure: &Procedure) -> Vec<String> {
        procedure.lines(&self.config.indent)
    }

    pub fn render(&self, result: &TransformResult) -> String {
        let mut out: Vec<String> = Vec::new();
        match self.config.order {
            EmitOrder::ProceduresFirst => {
                for procedure in &result.procedures {
                    self.push_procedure(&mut out, procedure);
                }
                out.extend(result.residual.iter().cloned());
            }
            EmitOrder::Interleaved => {
                let mut groups = result.groups.iter().peekable();
                for index in 0..=result.residual.len() {
                    while let Some(group) = groups.next_if(|g| g.anchor <= index) {
                        for procedure in &result.procedures[group.procedures.clone()] {
                            self.push_procedure(&mut out, procedure);
                        }
                    }
                    if let Some(line) = result.residual.get(index) {
                        out.push(line.clone());
                    }
                }
            }
        }
        let mut text = out.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    fn push_procedure(&self, out: &mut Vec<String>, procedure: &Procedure) {
        out.extend(self.procedure(procedure));
        out.push(String::new());
    }
}
