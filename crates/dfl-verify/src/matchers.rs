//! Evidence matchers: does one artifact show that one element was
//! disconnected?
//!
//! Matchers assume the artifact exists. [`check_file_with`] handles the
//! missing-file case and turns the matcher's verdict (or parse error) into a
//! [`CheckOutcome`].

use crate::outcome::{CheckKind, CheckOutcome};
use dfl_core::{is_strict_zero, DflResult, Diagnostics, ElementType, EvidenceKey, FinalStatePolicy};
use dfl_io::timeline::TimelineSource;
use dfl_io::xml::find_by_id;
use std::path::Path;

/// Marker the simulator puts in the model name of a calculated bus that
/// went down with a busbar section.
pub const CALCULATED_BUS_MARKER: &str = "calculatedBus";

pub trait EvidenceMatcher: Send + Sync {
    fn kind(&self) -> CheckKind;

    /// Look for `key` in `artifact`. Details of a negative verdict go to
    /// `diagnostics`.
    fn matches(&self, artifact: &Path, key: &EvidenceKey, diagnostics: &mut Diagnostics)
        -> DflResult<bool>;
}

/// `blackBoxModel` with id `Disconnect_{key}` in the `.dyd` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelDeclarationMatcher;

impl EvidenceMatcher for ModelDeclarationMatcher {
    fn kind(&self) -> CheckKind {
        CheckKind::ModelDeclaration
    }

    fn matches(&self, artifact: &Path, key: &EvidenceKey, diagnostics: &mut Diagnostics) -> DflResult<bool> {
        let id = key.disconnect_id();
        let found = find_by_id(artifact, Some("blackBoxModel"), &id)?.is_some();
        if !found {
            diagnostics.add_error_with_entity(
                self.kind().as_str(),
                &format!("blackBoxModel '{id}' not found"),
                &key.id,
            );
        }
        Ok(found)
    }
}

/// `set` with id `Disconnect_{key}` in the `.par` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterMatcher;

impl EvidenceMatcher for ParameterMatcher {
    fn kind(&self) -> CheckKind {
        CheckKind::Parameters
    }

    fn matches(&self, artifact: &Path, key: &EvidenceKey, diagnostics: &mut Diagnostics) -> DflResult<bool> {
        let id = key.disconnect_id();
        let found = find_by_id(artifact, Some("set"), &id)?.is_some();
        if !found {
            diagnostics.add_error_with_entity(
                self.kind().as_str(),
                &format!("parameter set '{id}' not found"),
                &key.id,
            );
        }
        Ok(found)
    }
}

#[derive(Debug, Clone)]
pub struct TimelineMatcher {
    /// Contingency-application time stamped on legacy log lines.
    pub event_time: String,
}

impl Default for TimelineMatcher {
    fn default() -> Self {
        Self {
            event_time: dfl_io::DEFAULT_EVENT_TIME.to_string(),
        }
    }
}

impl TimelineMatcher {
    pub fn new(event_time: impl Into<String>) -> Self {
        Self {
            event_time: event_time.into(),
        }
    }
}

impl EvidenceMatcher for TimelineMatcher {
    fn kind(&self) -> CheckKind {
        CheckKind::Timeline
    }

    fn matches(&self, artifact: &Path, key: &EvidenceKey, diagnostics: &mut Diagnostics) -> DflResult<bool> {
        let source = TimelineSource::load(artifact, &self.event_time)?;
        let busbar = key.kind == ElementType::BusbarSection;
        let found = source.events().iter().any(|event| {
            event.model_name == key.id || (busbar && event.model_name.contains(CALCULATED_BUS_MARKER))
        });
        if !found {
            diagnostics.add_error_with_entity(
                self.kind().as_str(),
                &format!(
                    "no {} timeline event for '{}'; timeline content:\n{}",
                    source.format_name(),
                    key.id,
                    source.raw()
                ),
                &key.id,
            );
        }
        Ok(found)
    }
}

/// Element with the key's id in the IIDM final state, carrying the flows
/// its type requires of a disconnected element.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalStateMatcher;

impl EvidenceMatcher for FinalStateMatcher {
    fn kind(&self) -> CheckKind {
        CheckKind::FinalState
    }

    fn matches(&self, artifact: &Path, key: &EvidenceKey, diagnostics: &mut Diagnostics) -> DflResult<bool> {
        let category = self.kind().as_str();
        let Some(element) = find_by_id(artifact, None, &key.id)? else {
            diagnostics.add_error_with_entity(category, &format!("element '{}' not found", key.id), &key.id);
            return Ok(false);
        };

        let mut ok = true;
        match key.kind.final_state_policy() {
            FinalStatePolicy::Absent(attrs) => {
                for attr in attrs {
                    if let Some(value) = element.attr(attr) {
                        ok = false;
                        diagnostics.add_error_with_entity(
                            category,
                            &format!("{} '{}': attribute {attr} = \"{value}\" should be absent", element.name, key.id),
                            &key.id,
                        );
                    }
                }
            }
            FinalStatePolicy::Zero(attrs) => {
                for attr in attrs {
                    match element.attr(attr) {
                        Some(value) if is_strict_zero(value) => {}
                        Some(value) => {
                            ok = false;
                            diagnostics.add_error_with_entity(
                                category,
                                &format!("{} '{}': attribute {attr} = \"{value}\", expected 0", element.name, key.id),
                                &key.id,
                            );
                        }
                        None => {
                            ok = false;
                            diagnostics.add_error_with_entity(
                                category,
                                &format!("{} '{}': attribute {attr} missing", element.name, key.id),
                                &key.id,
                            );
                        }
                    }
                }
            }
            FinalStatePolicy::Unchecked => {}
        }
        Ok(ok)
    }
}

/// Run `matcher` on `artifact` when it exists.
///
/// A missing file or a file that does not parse fails the check with one
/// counted difference; neither is propagated.
pub fn check_file_with(
    matcher: &dyn EvidenceMatcher,
    artifact: &Path,
    contingency_id: &str,
    element_id: &str,
    key: &EvidenceKey,
) -> CheckOutcome {
    let kind = matcher.kind();
    let mut outcome = CheckOutcome::new(contingency_id, kind, artifact).for_element(element_id, &key.id);

    if !artifact.is_file() {
        outcome.record_failure(&format!(
            "{} file {} not found",
            kind.label(),
            artifact.display()
        ));
        return outcome;
    }

    let mut details = Diagnostics::new();
    match matcher.matches(artifact, key, &mut details) {
        Ok(true) => {
            outcome
                .diagnostics
                .add_info(kind.as_str(), &format!("{} check passed for {key}", kind.label()));
        }
        Ok(false) => {
            outcome.differences += 1;
            outcome.diagnostics.merge(details);
            outcome.diagnostics.add_error_with_entity(
                kind.as_str(),
                &format!("{} check failed for {contingency_id}", kind.label()),
                element_id,
            );
        }
        Err(err) => {
            outcome.record_failure(&format!("{} check failed for {contingency_id}: {err}", kind.label()));
        }
    }
    outcome
}
