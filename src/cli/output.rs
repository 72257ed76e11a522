//! User-facing output for the CLI: colors, diffs, listings and JSON.

use std::io::Write;

use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::{
    engine::TransformResult,
    errors::{ErrorKind, IimportError},
};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

pub fn print_heading(text: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    let _ = writeln!(stdout, "--- {text} ---");
    let _ = stdout.reset();
}

/// Prints program text exactly as produced.
pub fn print_text(text: &str) {
    print!("{text}");
    if !text.is_empty() && !text.ends_with('\n') {
        println!();
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), IimportError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ErrorKind::Output {
        reason: e.to_string(),
    })?;
    println!("{json}");
    Ok(())
}

/// One line per procedure: signature, then where it came from.
pub fn print_procedures(result: &TransformResult) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for procedure in &result.procedures {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = write!(stdout, "{}", procedure.signature);
        let _ = stdout.reset();
        let _ = writeln!(stdout, "  ({} to {})", procedure.opened_at, procedure.closed_at);
    }
}

pub fn print_diff(before: &str, after: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let changeset = Changeset::new(before, after, "\n");
    for diff in &changeset.diffs {
        let (color, marker, text) = match diff {
            Difference::Same(x) => (None, ' ', x),
            Difference::Add(x) => (Some(Color::Green), '+', x),
            Difference::Rem(x) => (Some(Color::Red), '-', x),
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(color));
        for line in text.split('\n') {
            let _ = writeln!(stdout, "{marker}{line}");
        }
    }
    let _ = stdout.reset();
}

/// A pass/fail line for `check`.
pub fn print_status(path: &str, ok: bool) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let (color, label) = if ok {
        (Color::Green, "ok")
    } else {
        (Color::Red, "FAILED")
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{label:>6}");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {path}");
}
