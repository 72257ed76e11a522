use std::{collections::BTreeMap, ops::Range};

use serde::Serialize;

use super::frame::Procedure;

/// The procedures hoisted out of one top-level frame, in postorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureGroup {
    /// Index into the residual lines where the top-level frame stood.
    pub anchor: usize,
    pub procedures: Range<usize>,
}

/// Output of one transform run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    /// All procedures, callees before callers.
    pub procedures: Vec<Procedure>,
    /// Top-level code with call sites already substituted.
    pub residual: Vec<String>,
    pub groups: Vec<ProcedureGroup>,
    /// Declared name to index in `procedures`.
    pub names: BTreeMap<String, usize>,
}

impl TransformResult {
    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.names.get(name).map(|&i| &self.procedures[i])
    }

    pub fn procedure_names(&self) -> impl Iterator<Item = &str> {
        self.procedures.iter().map(|p| p.name.as_str())
    }

    /// Position of a procedure in emission order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn residual_text(&self) -> String {
        self.residual.join("\n")
    }
}
