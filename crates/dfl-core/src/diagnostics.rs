//! Diagnostics buffer for verification runs.
//!
//! Every check records what it saw here instead of printing directly, so a
//! scenario's messages can be collected off-thread and emitted in a stable
//! order once the scenario is done.
//!
//! - Severity levels (Info, Warning, Error)
//! - Categories for grouping issues (dyd, par, timeline, final-state, ...)
//! - Optional entity references (contingency id, element id)
//! - Optional file path the message refers to
//!
//! # Example
//!
//! ```
//! use dfl_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_info("dyd", "No difference");
//! diag.add_error_with_entity("final-state", "attribute p1 = \"0.0\"", "L1");
//!
//! assert_eq!(diag.issues.len(), 2);
//! assert_eq!(diag.issues[1].severity, Severity::Error);
//! ```

use serde::Serialize;
use std::path::Path;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress line (verbose output)
    Info,
    /// Unusual but not counted (e.g. reference absent, not checked)
    Warning,
    /// Counted disagreement or failed check
    Error,
}

/// A single diagnostic line
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g. "dyd", "timeline", "completeness")
    pub category: String,
    /// Human-readable description
    pub message: String,
    /// Optional entity reference (contingency or element id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Optional artifact path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
            path: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(path) = &self.path {
            write!(f, " [{}]", path)?;
        }

        Ok(())
    }
}

/// Ordered collection of diagnostic lines for one check, scenario or run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_info(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Info, category, message));
    }

    pub fn add_warning_with_path(&mut self, category: &str, message: &str, path: &Path) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_path(path));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn add_error_with_path(&mut self, category: &str, message: &str, path: &Path) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_path(path));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Append another buffer, keeping its order.
    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }
}
