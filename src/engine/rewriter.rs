//! Call-site rewriting.
//!
//! A closed child frame is represented in its parent by a single call. The
//! arguments are the child's parameter names, resolved in the parent's scope
//! at run time, which is what lets a hoisted procedure replace inline code.

use super::frame::{FrameKind, ProcedureFrame};

/// `a, b = name(p1, p2)`, or a bare `name(p1, p2)` without declared results.
/// Examples and nameless frames are never called.
pub fn call_expression(frame: &ProcedureFrame) -> Option<String> {
    if frame.kind == FrameKind::Example {
        return None;
    }
    let name = frame.name.as_deref()?;
    let args: Vec<&str> = frame.params.iter().map(|p| p.name.as_str()).collect();
    let call = format!("{}({})", name, args.join(", "));
    if frame.returns.is_empty() {
        Some(call)
    } else {
        Some(format!("{} = {}", frame.returns.join(", "), call))
    }
}

/// The trailing `return` of a procedure, if it declared results.
pub fn return_statement(frame: &ProcedureFrame) -> Option<String> {
    if frame.returns.is_empty() {
        None
    } else {
        Some(format!("return {}", frame.returns.join(", ")))
    }
}
