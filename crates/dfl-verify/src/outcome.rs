use dfl_core::Diagnostics;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a single check looked at.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    ModelDeclaration,
    Parameters,
    Timeline,
    FinalState,
    Constraints,
    LostEquipment,
    AggregatedResults,
    /// Invalid contingency must not have produced an artifact.
    Absence,
    /// Reference artifact must have a results counterpart.
    Completeness,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::ModelDeclaration => "dyd",
            CheckKind::Parameters => "par",
            CheckKind::Timeline => "timeline",
            CheckKind::FinalState => "final-state",
            CheckKind::Constraints => "constraints",
            CheckKind::LostEquipment => "lost-equipment",
            CheckKind::AggregatedResults => "aggregated-results",
            CheckKind::Absence => "absence",
            CheckKind::Completeness => "completeness",
        }
    }

    /// Name used in human-readable lines.
    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::ModelDeclaration => "Dyd",
            CheckKind::Parameters => "Par",
            CheckKind::Timeline => "Timeline",
            CheckKind::FinalState => "Final State IIDM",
            CheckKind::Constraints => "Constraints",
            CheckKind::LostEquipment => "Lost equipments",
            CheckKind::AggregatedResults => "Aggregated results",
            CheckKind::Absence => "Invalid contingency",
            CheckKind::Completeness => "Completeness",
        }
    }
}

/// Result of one check. `differences == 0` means it passed.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    /// Contingency or scenario the check belongs to; empty for test-level checks.
    pub scenario: String,
    pub kind: CheckKind,
    /// Declared element the check verifies, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Evidence key id searched for (differs from `element` for windings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub path: PathBuf,
    pub differences: usize,
    pub diagnostics: Diagnostics,
}

impl CheckOutcome {
    pub fn new(scenario: &str, kind: CheckKind, path: &Path) -> Self {
        Self {
            scenario: scenario.to_string(),
            kind,
            element: None,
            subject: None,
            path: path.to_path_buf(),
            differences: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn for_element(mut self, element: &str, subject: &str) -> Self {
        self.element = Some(element.to_string());
        self.subject = Some(subject.to_string());
        self
    }

    /// Mark the check failed with one counted error line.
    pub fn fail(mut self, message: impl AsRef<str>) -> Self {
        self.record_failure(message.as_ref());
        self
    }

    pub fn record_failure(&mut self, message: &str) {
        self.differences += 1;
        self.diagnostics
            .add_error_with_path(self.kind.as_str(), message, &self.path);
    }

    pub fn passed(&self) -> bool {
        self.differences == 0
    }
}

pub fn total_differences<'a>(outcomes: impl IntoIterator<Item = &'a CheckOutcome>) -> usize {
    outcomes.into_iter().map(|o| o.differences).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_adds_one_difference_and_an_error_line() {
        let outcome = CheckOutcome::new("CONT_1", CheckKind::Parameters, Path::new("m-CONT_1.par"))
            .for_element("L1", "L1")
            .fail("Par check failed for CONT_1");
        assert!(!outcome.passed());
        assert_eq!(outcome.differences, 1);
        assert_eq!(outcome.diagnostics.issues.len(), 1);
        assert_eq!(outcome.diagnostics.issues[0].severity, dfl_core::Severity::Error);
        assert_eq!(
            outcome.diagnostics.issues[0].path.as_deref(),
            Some("m-CONT_1.par")
        );
    }

    #[test]
    fn totals_sum_every_outcome() {
        let a = CheckOutcome::new("A", CheckKind::FinalState, Path::new("a")).fail("x");
        let mut b = CheckOutcome::new("B", CheckKind::Constraints, Path::new("b"));
        b.differences = 3;
        let c = CheckOutcome::new("C", CheckKind::LostEquipment, Path::new("c"));
        assert_eq!(total_differences([&a, &b, &c]), 4);
    }
}
