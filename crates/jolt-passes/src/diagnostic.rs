//! Diagnostic collection for normalization passes
//!
//! Passes never render diagnostics; they record them in [`Problems`] and the
//! driver hands them to a renderer. [`Diagnostic::to_codespan`] converts to
//! the `codespan-reporting` model for that purpose.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity as CsSeverity};
use jolt_ast::Span;
use serde::{Deserialize, Serialize};

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// Non-null assertion inserted on a `null` literal
pub const NULL_ASSERTION_ON_NULL: ErrorCode = ErrorCode("W4001");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl From<Severity> for CsSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => CsSeverity::Error,
            Severity::Warning => CsSeverity::Warning,
            Severity::Note => CsSeverity::Note,
        }
    }
}

/// A diagnostic message attached to a source position
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            span: None,
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a note diagnostic
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the source position
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Convert to a codespan diagnostic labelled in `file_id`
    pub fn to_codespan(&self, file_id: usize) -> CsDiagnostic<usize> {
        let mut inner = CsDiagnostic::new(self.severity.into()).with_message(&self.message);
        if let Some(code) = self.code {
            inner = inner.with_code(code.0);
        }
        if let Some(span) = self.span {
            inner = inner.with_labels(vec![Label::primary(file_id, span.start..span.end)]);
        }
        inner
    }

    /// Convert to JSON representation for tooling
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from(self))
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: Severity,
    pub message: String,
    /// Line (1-indexed)
    pub line: Option<u32>,
    /// Column (1-indexed)
    pub column: Option<u32>,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(diag: &Diagnostic) -> Self {
        JsonDiagnostic {
            code: diag.code.map(|c| c.0.to_string()),
            severity: diag.severity,
            message: diag.message.clone(),
            line: diag.span.map(|s| s.line),
            column: diag.span.map(|s| s.column),
        }
    }
}

/// Diagnostics accumulated while processing one compilation unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problems {
    diagnostics: Vec<Diagnostic>,
}

impl Problems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record a warning at `span`
    pub fn warning(&mut self, span: Span, code: ErrorCode, message: impl Into<String>) {
        self.report(Diagnostic::warning(message).with_code(code).with_span(span));
    }

    /// Record an error at `span`
    pub fn error(&mut self, span: Span, code: ErrorCode, message: impl Into<String>) {
        self.report(Diagnostic::error(message).with_code(code).with_span(span));
    }

    pub fn extend(&mut self, other: Problems) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

impl IntoIterator for Problems {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}
