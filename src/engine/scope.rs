//! The scope stack: an arena of frames plus the chain of currently open ones.
//!
//! Parent/child links are arena indices, so the tree needs no shared pointers.

use crate::{
    document::Coord,
    errors::{ErrorKind, OpenFrame},
    markup::ParameterSpec,
};

use super::frame::{FrameId, FrameKind, ProcedureFrame};

/// Everything needed to open a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub kind: FrameKind,
    pub name: Option<String>,
    pub params: Vec<ParameterSpec>,
    pub returns: Vec<String>,
    pub indent: String,
    pub opened_at: Coord,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<ProcedureFrame>,
    open: Vec<FrameId>,
    roots: Vec<FrameId>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a frame as a child of the current top, or as a new root.
    pub fn push(&mut self, spec: FrameSpec) -> FrameId {
        let id = FrameId(self.frames.len());
        let parent = self.open.last().copied();
        match parent {
            Some(p) => self.frames[p.0].children.push(id),
            None => self.roots.push(id),
        }
        self.frames.push(ProcedureFrame {
            id,
            kind: spec.kind,
            name: spec.name,
            params: spec.params,
            returns: spec.returns,
            indent: spec.indent,
            body: Vec::new(),
            children: Vec::new(),
            parent,
            opened_at: spec.opened_at,
            closed_at: None,
        });
        self.open.push(id);
        id
    }

    /// Closes the innermost open frame.
    pub fn pop(&mut self, at: Coord) -> Result<FrameId, ErrorKind> {
        let id = self.open.pop().ok_or(ErrorKind::UnmatchedEnd { at })?;
        self.frames[id.0].closed_at = Some(at);
        Ok(id)
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn top(&self) -> Option<&ProcedureFrame> {
        self.open.last().map(|id| &self.frames[id.0])
    }

    pub fn top_mut(&mut self) -> Option<&mut ProcedureFrame> {
        let id = *self.open.last()?;
        Some(&mut self.frames[id.0])
    }

    pub fn get(&self, id: FrameId) -> &ProcedureFrame {
        &self.frames[id.0]
    }

    pub fn get_mut(&mut self, id: FrameId) -> &mut ProcedureFrame {
        &mut self.frames[id.0]
    }

    pub fn roots(&self) -> &[FrameId] {
        &self.roots
    }

    /// Fails if any frame is still open, listing all of them outermost first.
    pub fn ensure_closed(&self) -> Result<(), ErrorKind> {
        if self.open.is_empty() {
            return Ok(());
        }
        let open = self
            .open
            .iter()
            .map(|id| {
                let frame = &self.frames[id.0];
                OpenFrame {
                    name: frame.display_name().to_string(),
                    at: frame.opened_at,
                }
            })
            .collect();
        Err(ErrorKind::UnterminatedDefinition { open })
    }
}
