//! The diagnostic record every compiler stage reports.

use std::fmt;

use kiln_ir::Span;

use crate::error_code::Category;
use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A secondary location with an explanation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

/// A reported problem: position, severity, message key and arguments.
///
/// The position is a constructor argument, so no diagnostic can be built
/// without one.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported to a sink, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub span: Span,
    /// Arguments substituted into the code's template.
    pub args: Vec<String>,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, severity: Severity, span: Span) -> Self {
        Diagnostic {
            code,
            severity,
            span,
            args: Vec::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// A diagnostic with the code's default severity.
    #[cold]
    pub fn of(code: ErrorCode, span: Span) -> Self {
        Self::new(code, code.default_severity(), span)
    }

    #[cold]
    pub fn error(code: ErrorCode, span: Span) -> Self {
        Self::new(code, Severity::Error, span)
    }

    #[cold]
    pub fn warning(code: ErrorCode, span: Span) -> Self {
        Self::new(code, Severity::Warning, span)
    }

    pub fn with_arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    pub fn category(&self) -> Category {
        self.code.category()
    }

    /// The template with arguments filled in. Missing arguments render as `?`.
    pub fn message(&self) -> String {
        let template = self.code.template();
        let mut out = String::with_capacity(template.len() + 16);
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let arg = after[..close]
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| self.args.get(i));
                    out.push_str(arg.map_or("?", String::as_str));
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {}: {}",
            self.severity,
            self.code,
            self.span,
            self.message()
        )?;
        for label in &self.labels {
            write!(f, "\n  --> {}: {}", label.span, label.message)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
