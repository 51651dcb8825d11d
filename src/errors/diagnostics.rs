//! Reporting of errors and warnings.
//!
//! The compiler never prints diagnostics itself; it hands them to a
//! [`DiagnosticSink`]. The command-line driver uses [`ConsoleSink`], tests
//! collect them into a `Vec<Diagnostic>`.

use std::fmt::Display;

use log::debug;

use crate::{get_line_at_position, remove_starting_whitespace, Position};

use super::errors::{Error, ErrorTip, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(warning: &Warning, position: Position) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            position,
            message: warning.to_string(),
        }
    }

    pub fn error(error: &Error) -> Self {
        Diagnostic {
            severity: Severity::Error,
            position: error.get_position().clone(),
            message: error.get_message(),
        }
    }
}

/// `file:line:column:` followed by the prefixed message on its own line.
impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.position)?;
        write!(f, "{}: {}", self.severity, self.message)
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Writes diagnostics to stderr, quoting the offending source line when the
/// source text is known.
pub struct ConsoleSink {
    source: Option<String>,
    errors: usize,
    warnings: usize,
}

impl ConsoleSink {
    pub fn new(source: Option<String>) -> Self {
        ConsoleSink {
            source,
            errors: 0,
            warnings: 0,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Reports an error together with its tip, if it has one.
    pub fn report_error(&mut self, error: &Error) {
        self.report(Diagnostic::error(error));
        if let ErrorTip::Suggestion(tip) = error.get_tip() {
            eprintln!("  tip: {}", tip);
        }
    }

    /*
        src/add.zp:3:5:
        Warning: converting from `i64` to `i32` loses precision
          |
        3 | return b;
          | ^
    */
    fn render_excerpt(&self, position: &Position) {
        let Some(source) = &self.source else {
            return;
        };
        let Some(line_text) = get_line_at_position(source, position.line) else {
            return;
        };

        let line_string = position.line.to_string();
        let padding = line_string.len() + 2;
        let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
        let arrows = (position.column as usize).saturating_sub(removed_whitespace).max(1);

        eprintln!("{:>padding$}", "|");
        eprintln!("{} | {}", line_string, line_text_removed.trim_end());
        eprintln!("{:>padding$} {:->arrows$}", "|", "^");
    }
}

impl DiagnosticSink for ConsoleSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{} at {}", diagnostic.severity, diagnostic.position);
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }

        eprintln!("{}", diagnostic);
        self.render_excerpt(&diagnostic.position);
    }
}
