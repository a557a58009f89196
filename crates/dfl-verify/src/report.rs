use crate::outcome::CheckOutcome;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dfl_core::Severity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One check as written to the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRecord {
    pub scenario: String,
    pub kind: String,
    pub element: Option<String>,
    pub path: String,
    pub passed: bool,
    pub differences: usize,
    /// Warning and error lines; progress lines are left out.
    pub messages: Vec<String>,
}

impl From<&CheckOutcome> for CheckRecord {
    fn from(outcome: &CheckOutcome) -> Self {
        Self {
            scenario: outcome.scenario.clone(),
            kind: outcome.kind.as_str().to_string(),
            element: outcome.element.clone(),
            path: outcome.path.display().to_string(),
            passed: outcome.passed(),
            differences: outcome.differences,
            messages: outcome
                .diagnostics
                .issues
                .iter()
                .filter(|issue| issue.severity != Severity::Info)
                .map(|issue| issue.message.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationReport {
    pub created_at: DateTime<Utc>,
    pub command: String,
    pub differences: usize,
    pub num_checks: usize,
    pub checks: Vec<CheckRecord>,
}

impl VerificationReport {
    pub fn new<'a>(command: &str, outcomes: impl IntoIterator<Item = &'a CheckOutcome>) -> Self {
        let checks: Vec<CheckRecord> = outcomes.into_iter().map(CheckRecord::from).collect();
        Self {
            created_at: Utc::now(),
            command: command.to_string(),
            differences: checks.iter().map(|c| c.differences).sum(),
            num_checks: checks.len(),
            checks,
        }
    }
}

pub fn write_report(path: &Path, report: &VerificationReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serializing verification report")?;
    fs::write(path, json).with_context(|| format!("writing report '{}'", path.display()))?;
    Ok(())
}
