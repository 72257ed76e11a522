//! Procedure frames and the builder that turns a closed frame into a procedure.

use serde::Serialize;

use crate::{config::EmitConfig, document::Coord, markup::ParameterSpec};

use super::{rewriter, scope::ScopeStack};

/// Index of a frame in the scope stack's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameKind {
    /// A callable procedure, hoisted and called from its parent.
    Procedure,
    /// Demo code: emitted only when named, never called from the parent.
    Example,
}

/// One line of an open frame's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyLine {
    Text(String),
    /// Stands where a child frame's source used to be.
    Call { frame: FrameId, indent: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureFrame {
    pub id: FrameId,
    pub kind: FrameKind,
    pub name: Option<String>,
    pub params: Vec<ParameterSpec>,
    pub returns: Vec<String>,
    /// Indentation of the header line in the document.
    pub indent: String,
    pub body: Vec<BodyLine>,
    pub children: Vec<FrameId>,
    pub parent: Option<FrameId>,
    pub opened_at: Coord,
    pub closed_at: Option<Coord>,
}

impl ProcedureFrame {
    /// Appends a code line, dropping the header's indentation from it.
    pub fn append_text(&mut self, text: &str) {
        let text = dedent(text, self.indent.len());
        self.body.push(BodyLine::Text(text.to_string()));
    }

    /// Appends a call placeholder for `child`, whose header sat at `indent`.
    pub fn append_call(&mut self, child: FrameId, indent: &str) {
        let indent = dedent(indent, self.indent.len()).to_string();
        self.body.push(BodyLine::Call {
            frame: child,
            indent,
        });
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<example>")
    }
}

/// Removes up to `width` bytes of leading blanks.
pub(crate) fn dedent(text: &str, width: usize) -> &str {
    let blanks = text
        .bytes()
        .take(width)
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &text[blanks..]
}

// ============================================================================
// FINISHED PROCEDURES
// ============================================================================

/// A finalized, immutable procedure ready for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Procedure {
    pub name: String,
    pub kind: FrameKind,
    pub params: Vec<ParameterSpec>,
    pub returns: Vec<String>,
    pub signature: String,
    /// Docstring lines, quotes included. Empty when docstrings are off.
    pub doc: Vec<String>,
    /// Body lines relative to the procedure's indentation, trailing return included.
    pub body: Vec<String>,
    /// Procedures this one calls, in call order.
    pub callees: Vec<String>,
    pub opened_at: Coord,
    pub closed_at: Coord,
}

impl Procedure {
    /// Emitted lines, each body line indented by one `indent` unit.
    pub fn lines(&self, indent: &str) -> Vec<String> {
        let mut lines = vec![self.signature.clone()];
        let nested = self.doc.iter().chain(self.body.iter());
        lines.extend(nested.map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{indent}{l}")
            }
        }));
        if self.doc.is_empty() && self.body.iter().all(|l| l.trim().is_empty()) {
            lines.push(format!("{indent}pass"));
        }
        lines
    }

    pub fn render(&self, indent: &str) -> String {
        self.lines(indent).join("\n")
    }
}

/// Synthesizes the procedure for a closed frame. Nameless examples give `None`.
pub fn finalize(stack: &ScopeStack, id: FrameId, config: &EmitConfig) -> Option<Procedure> {
    let frame = stack.get(id);
    let name = frame.name.clone()?;
    let closed_at = frame.closed_at.unwrap_or(frame.opened_at);

    let declarations: Vec<String> = frame.params.iter().map(ParameterSpec::declaration).collect();
    let signature = format!("def {}({}):", name, declarations.join(", "));

    let mut doc = Vec::new();
    if config.docstrings && (!frame.params.is_empty() || !frame.returns.is_empty()) {
        doc.push("\"\"\"".to_string());
        if !frame.params.is_empty() {
            doc.push("Parameters:".to_string());
            doc.extend(declarations.iter().map(|d| format!(":param {d}")));
        }
        if !frame.returns.is_empty() {
            if !frame.params.is_empty() {
                doc.push(String::new());
            }
            doc.push("Returns:".to_string());
            doc.push(frame.returns.join(", "));
        }
        doc.push("\"\"\"".to_string());
    }

    let mut body = Vec::with_capacity(frame.body.len() + 1);
    let mut callees = Vec::new();
    for line in &frame.body {
        match line {
            BodyLine::Text(text) => body.push(text.clone()),
            BodyLine::Call { frame: child, indent } => {
                let child = stack.get(*child);
                if let Some(call) = rewriter::call_expression(child) {
                    body.push(format!("{indent}{call}"));
                    callees.push(child.display_name().to_string());
                }
            }
        }
    }
    if let Some(ret) = rewriter::return_statement(frame) {
        body.push(ret);
    }

    Some(Procedure {
        name,
        kind: frame.kind,
        params: frame.params.clone(),
        returns: frame.returns.clone(),
        signature,
        doc,
        body,
        callees,
        opened_at: frame.opened_at,
        closed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scope::FrameSpec;

    fn spec(name: &str, params: &[&str], returns: &[&str]) -> FrameSpec {
        FrameSpec {
            kind: FrameKind::Procedure,
            name: Some(name.to_string()),
            params: params.iter().map(|p| ParameterSpec::new(*p, None)).collect(),
            returns: returns.iter().map(|r| r.to_string()).collect(),
            indent: String::new(),
            opened_at: Coord::default(),
        }
    }

    #[test]
    fn dedent_stops_at_code() {
        assert_eq!(dedent("        x", 4), "    x");
        assert_eq!(dedent("  x", 4), "x");
        assert_eq!(dedent("x", 4), "x");
        assert_eq!(dedent("", 4), "");
    }

    #[test]
    fn finalize_adds_docstring_and_return() {
        let mut stack = ScopeStack::new();
        let id = stack.push(spec("calc", &["a", "b"], &["total"]));
        stack.top_mut().unwrap().append_text("total = a + b");
        stack.pop(Coord::new(0, 3)).unwrap();

        let proc = finalize(&stack, id, &EmitConfig::default()).unwrap();
        assert_eq!(proc.signature, "def calc(a, b):");
        assert_eq!(proc.doc.first().map(String::as_str), Some("\"\"\""));
        assert!(proc.doc.contains(&":param a".to_string()));
        assert_eq!(proc.body, vec!["total = a + b", "return total"]);
        assert_eq!(proc.closed_at, Coord::new(0, 3));
    }

    #[test]
    fn no_return_without_declared_names() {
        let mut stack = ScopeStack::new();
        let id = stack.push(spec("show", &["x"], &[]));
        stack.top_mut().unwrap().append_text("print(x)");
        stack.pop(Coord::default()).unwrap();
        let config = EmitConfig {
            docstrings: false,
            ..EmitConfig::default()
        };
        let proc = finalize(&stack, id, &config).unwrap();
        assert_eq!(proc.render("    "), "def show(x):\n    print(x)");
    }

    #[test]
    fn empty_body_gets_pass() {
        let mut stack = ScopeStack::new();
        let id = stack.push(spec("noop", &[], &[]));
        stack.pop(Coord::default()).unwrap();
        let proc = finalize(&stack, id, &EmitConfig::default()).unwrap();
        assert_eq!(proc.lines("  "), vec!["def noop():", "  pass"]);
    }
}
