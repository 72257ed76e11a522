//! The single-pass transformer.
//!
//! Lines stream through the classifier, the exclusion filter and the scope
//! stack. Frames are finalized the moment they close, so procedures come out
//! in postorder without a separate tree walk.

use std::collections::BTreeMap;

use crate::{
    config::EmitConfig,
    document::{Coord, SourceLine},
    errors::ErrorKind,
    markup::{Classifier, Dialect, Header, Line, TokenKind},
};

use super::{
    filter::ExclusionFilter,
    frame::{self, FrameId, FrameKind, Procedure},
    result::{ProcedureGroup, TransformResult},
    rewriter,
    scope::{FrameSpec, ScopeStack},
};

/// Top-level code waiting for its call sites to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResidualLine {
    Text(String),
    Call(FrameId, String),
}

#[derive(Debug, Clone)]
pub struct Transformer {
    dialect: Dialect,
    emit: EmitConfig,
    stack: ScopeStack,
    filter: ExclusionFilter,
    residual: Vec<ResidualLine>,
    procedures: Vec<Procedure>,
    groups: Vec<ProcedureGroup>,
    /// Where the currently open top-level frame started: (anchor, first procedure).
    open_group: Option<(usize, usize)>,
    declared: BTreeMap<String, Coord>,
}

impl Transformer {
    pub fn new(dialect: Dialect, emit: EmitConfig) -> Self {
        Self {
            dialect,
            emit,
            stack: ScopeStack::new(),
            filter: ExclusionFilter::new(),
            residual: Vec::new(),
            procedures: Vec::new(),
            groups: Vec::new(),
            open_group: None,
            declared: BTreeMap::new(),
        }
    }

    /// Feeds one line. Returns the index of the procedure this line finished,
    /// if any. On error the transformer is left as it was before the line.
    pub fn step(&mut self, source: &SourceLine) -> Result<Option<usize>, ErrorKind> {
        if self.filter.absorb(&self.dialect, source) {
            return Ok(None);
        }
        let line = Classifier::new(&self.dialect).classify(source)?;
        if self.filter.excludes(&line) {
            return Ok(None);
        }
        match &line.kind {
            TokenKind::Code => {
                self.append(&line.raw);
                Ok(None)
            }
            TokenKind::DefineBegin(header) => {
                self.open_procedure(&line, header)?;
                Ok(None)
            }
            TokenKind::ExampleBegin(name) => {
                self.open_example(&line, name.clone())?;
                Ok(None)
            }
            TokenKind::DefineEnd => self.close(line.coord),
            TokenKind::SkipLine | TokenKind::SkipBlockBegin | TokenKind::SkipBlockEnd => Ok(None),
        }
    }

    pub fn procedure(&self, index: usize) -> Option<&Procedure> {
        self.procedures.get(index)
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// True when no frame and no skip block is open.
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty() && !self.filter.in_block()
    }

    /// Ends the input. Any open skip block or frame is an error.
    pub fn finish(self) -> Result<TransformResult, ErrorKind> {
        self.filter.ensure_closed()?;
        self.stack.ensure_closed()?;

        let residual = self
            .residual
            .iter()
            .filter_map(|line| match line {
                ResidualLine::Text(text) => Some(text.clone()),
                ResidualLine::Call(id, indent) => rewriter::call_expression(self.stack.get(*id))
                    .map(|call| format!("{indent}{call}")),
            })
            .collect();
        let names = self
            .procedures
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Ok(TransformResult {
            procedures: self.procedures,
            residual,
            groups: self.groups,
            names,
        })
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    fn append(&mut self, text: &str) {
        match self.stack.top_mut() {
            Some(frame) => frame.append_text(text),
            None => self.residual.push(ResidualLine::Text(text.to_string())),
        }
    }

    fn declare(&mut self, name: &str, at: Coord) -> Result<(), ErrorKind> {
        if let Some(first) = self.declared.get(name) {
            return Err(ErrorKind::DuplicateName {
                name: name.to_string(),
                at,
                first: *first,
            });
        }
        self.declared.insert(name.to_string(), at);
        Ok(())
    }

    fn open_procedure(&mut self, line: &Line, header: &Header) -> Result<(), ErrorKind> {
        self.declare(&header.name, line.coord)?;
        self.open(FrameSpec {
            kind: FrameKind::Procedure,
            name: Some(header.name.clone()),
            params: header.params.clone(),
            returns: header.returns.clone(),
            indent: line.indent.clone(),
            opened_at: line.coord,
        });
        Ok(())
    }

    fn open_example(&mut self, line: &Line, name: Option<String>) -> Result<(), ErrorKind> {
        if let Some(name) = &name {
            self.declare(name, line.coord)?;
        }
        self.open(FrameSpec {
            kind: FrameKind::Example,
            name,
            params: Vec::new(),
            returns: Vec::new(),
            indent: line.indent.clone(),
            opened_at: line.coord,
        });
        Ok(())
    }

    fn open(&mut self, spec: FrameSpec) {
        let kind = spec.kind;
        let indent = spec.indent.clone();
        if self.stack.is_empty() {
            self.open_group = Some((self.residual.len(), self.procedures.len()));
        }
        let id = self.stack.push(spec);
        let parent = self.stack.get(id).parent;
        tracing::debug!(
            name = self.stack.get(id).display_name(),
            depth = self.stack.depth(),
            "frame opened"
        );

        // The call goes exactly where the header stood.
        if kind == FrameKind::Procedure {
            match parent {
                Some(parent) => self.stack.get_mut(parent).append_call(id, &indent),
                None => self.residual.push(ResidualLine::Call(id, indent)),
            }
        }
    }

    fn close(&mut self, at: Coord) -> Result<Option<usize>, ErrorKind> {
        let id = self.stack.pop(at)?;
        let finished = frame::finalize(&self.stack, id, &self.emit).map(|procedure| {
            tracing::debug!(name = %procedure.name, %at, "frame closed");
            self.procedures.push(procedure);
            self.procedures.len() - 1
        });
        if self.stack.is_empty() {
            if let Some((anchor, first)) = self.open_group.take() {
                self.groups.push(ProcedureGroup {
                    anchor,
                    procedures: first..self.procedures.len(),
                });
            }
        }
        Ok(finished)
    }
}
