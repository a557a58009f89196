//! Postcondition checks for every declared contingency of a run.
//!
//! A contingency whose output directory exists was simulated (VALID) and
//! must leave evidence of each element's disconnection in the model,
//! parameter, timeline and final-state artifacts. One without an output
//! directory was rejected by the launcher (INVALID) and must not have
//! produced model or parameter files at all.

use crate::matchers::{
    check_file_with, EvidenceMatcher, FinalStateMatcher, ModelDeclarationMatcher,
    ParameterMatcher, TimelineMatcher,
};
use crate::outcome::{total_differences, CheckKind, CheckOutcome};
use dfl_core::{Contingency, Element};
use dfl_io::{ContingencyArtifacts, OutputClass, RunConfiguration, TestLayout};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Validity {
    Valid,
    Invalid,
}

impl Validity {
    pub fn classify(artifacts: &ContingencyArtifacts) -> Self {
        if artifacts.output_dir.is_dir() {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Validity::Valid => "VALID",
            Validity::Invalid => "INVALID",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContingencyReport {
    pub contingency_id: String,
    pub validity: Validity,
    pub outcomes: Vec<CheckOutcome>,
}

impl ContingencyReport {
    pub fn differences(&self) -> usize {
        total_differences(&self.outcomes)
    }

    pub fn passed(&self) -> bool {
        self.differences() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContingencyRunSummary {
    pub reports: Vec<ContingencyReport>,
}

impl ContingencyRunSummary {
    pub fn differences(&self) -> usize {
        self.reports.iter().map(ContingencyReport::differences).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ContingencyReport> {
        self.reports.iter().filter(|r| !r.passed())
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.reports.iter().flat_map(|r| r.outcomes.iter())
    }
}

pub struct ContingencyChecker {
    pub layout: TestLayout,
    /// Prefix of the per-contingency `.dyd`/`.par` file names.
    pub input_model: String,
    pub run: RunConfiguration,
    pub timeline: TimelineMatcher,
}

impl ContingencyChecker {
    pub fn new(layout: TestLayout, input_model: impl Into<String>, run: RunConfiguration) -> Self {
        Self {
            layout,
            input_model: input_model.into(),
            run,
            timeline: TimelineMatcher::default(),
        }
    }

    pub fn with_event_time(mut self, event_time: impl Into<String>) -> Self {
        self.timeline = TimelineMatcher::new(event_time);
        self
    }

    pub fn check_all(&self, contingencies: &[Contingency]) -> ContingencyRunSummary {
        let reports = contingencies
            .iter()
            .map(|contingency| self.check(contingency))
            .collect();
        ContingencyRunSummary { reports }
    }

    pub fn check(&self, contingency: &Contingency) -> ContingencyReport {
        let artifacts = self.layout.contingency(&self.input_model, &contingency.id);
        let validity = Validity::classify(&artifacts);
        debug!(
            contingency = %contingency.id,
            validity = validity.as_str(),
            "classified contingency"
        );

        let outcomes = match validity {
            Validity::Valid => contingency
                .elements
                .iter()
                .flat_map(|element| self.check_element(&contingency.id, element, &artifacts))
                .collect(),
            Validity::Invalid => check_absence(&contingency.id, &artifacts),
        };

        let report = ContingencyReport {
            contingency_id: contingency.id.clone(),
            validity,
            outcomes,
        };
        if report.passed() {
            info!("{} ({}) OK", report.contingency_id, validity.as_str());
        } else {
            warn!(
                "{} ({}) failed {} check(s)",
                report.contingency_id,
                validity.as_str(),
                report.differences()
            );
        }
        report
    }

    fn check_element(
        &self,
        contingency_id: &str,
        element: &Element,
        artifacts: &ContingencyArtifacts,
    ) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::new();
        let timeline_path = artifacts
            .timeline()
            .unwrap_or(artifacts.timeline_xml.as_path());

        for key in element.expand() {
            let checks: [(&dyn EvidenceMatcher, &Path); 2] = [
                (&ModelDeclarationMatcher, artifacts.dyd.as_path()),
                (&ParameterMatcher, artifacts.par.as_path()),
            ];
            for (matcher, path) in checks {
                outcomes.push(check_file_with(matcher, path, contingency_id, &element.id, &key));
            }
            if self.run.generates(OutputClass::Timeline) {
                outcomes.push(check_file_with(
                    &self.timeline,
                    timeline_path,
                    contingency_id,
                    &element.id,
                    &key,
                ));
            }
        }

        if !element.kind.is_known() {
            warn!(
                "{contingency_id}: element {} has unknown type {}, final state is not checked",
                element.id,
                element.kind.as_str()
            );
        }
        if self.run.generates(OutputClass::SteadyState) {
            outcomes.push(check_file_with(
                &FinalStateMatcher,
                &artifacts.final_state,
                contingency_id,
                &element.id,
                &element.final_state_key(),
            ));
        }
        outcomes
    }
}

fn check_absence(contingency_id: &str, artifacts: &ContingencyArtifacts) -> Vec<CheckOutcome> {
    [&artifacts.dyd, &artifacts.par]
        .into_iter()
        .map(|path| {
            let outcome = CheckOutcome::new(contingency_id, CheckKind::Absence, path);
            if path.exists() {
                outcome.fail(format!(
                    "{contingency_id} is invalid but {} exists",
                    path.display()
                ))
            } else {
                outcome
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfl_core::ElementType;
    use dfl_io::{BuildMode, SimulationKind};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn dyd(ids: &[&str]) -> String {
        let models: String = ids
            .iter()
            .map(|id| format!("  <dyn:blackBoxModel id=\"Disconnect_{id}\" lib=\"EventQuadripoleDisconnection\"/>\n"))
            .collect();
        format!("<dyn:dynamicModelsArchitecture xmlns:dyn=\"http://www.rte-france.com/dynawo\">\n{models}</dyn:dynamicModelsArchitecture>")
    }

    fn par(ids: &[&str]) -> String {
        let sets: String = ids
            .iter()
            .map(|id| format!("  <set id=\"Disconnect_{id}\"><par type=\"DOUBLE\" name=\"event_tEvent\" value=\"10\"/></set>\n"))
            .collect();
        format!("<parametersSet xmlns=\"http://www.rte-france.com/dynawo\">\n{sets}</parametersSet>")
    }

    const FINAL_STATE: &str = r#"<iidm:network xmlns:iidm="http://www.powsybl.org/schema/iidm/1_4" id="net">
  <iidm:line id="L1" p1="0" q1="-0" p2="0" q2="0"/>
  <iidm:threeWindingsTransformer id="T3" p1="0" q1="0" p2="0" q2="0" p3="0" q3="0"/>
</iidm:network>"#;

    struct Fixture {
        _dir: TempDir,
        layout: TestLayout,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let layout = TestLayout::new(dir.path(), "case");
            fs::create_dir_all(&layout.results_root).unwrap();
            Self { _dir: dir, layout }
        }

        fn simulated(&self, id: &str, dyd_ids: &[&str], par_ids: &[&str], final_state: &str) {
            let artifacts = self.layout.contingency("model", id);
            let final_dir = artifacts.final_state.parent().unwrap();
            fs::create_dir_all(final_dir).unwrap();
            fs::write(&artifacts.final_state, final_state).unwrap();
            fs::write(&artifacts.dyd, dyd(dyd_ids)).unwrap();
            fs::write(&artifacts.par, par(par_ids)).unwrap();
        }

        fn checker(&self, mode: BuildMode) -> ContingencyChecker {
            self.checker_for(RunConfiguration::new(mode, SimulationKind::SteadyStateCalculation))
        }

        fn checker_for(&self, run: RunConfiguration) -> ContingencyChecker {
            ContingencyChecker::new(self.layout.clone(), "model", run)
        }
    }

    #[test]
    fn valid_line_contingency_passes() {
        let fx = Fixture::new();
        fx.simulated("CONT_1", &["L1"], &["L1"], FINAL_STATE);
        let contingency = Contingency::new("CONT_1", vec![Element::new("L1", ElementType::Line)]);

        let report = fx.checker(BuildMode::Release).check(&contingency);
        assert_eq!(report.validity, Validity::Valid);
        assert!(report.passed(), "{:?}", report.outcomes);
        // dyd, par, final state; no timeline in release steady state
        assert_eq!(report.outcomes.len(), 3);
    }

    #[test]
    fn non_zero_flow_fails_and_names_element_and_attribute() {
        let fx = Fixture::new();
        fx.simulated("CONT_1", &["L1"], &["L1"], &FINAL_STATE.replace(r#"p1="0" q1"#, r#"p1="0.0" q1"#));
        let contingency = Contingency::new("CONT_1", vec![Element::new("L1", ElementType::Line)]);

        let report = fx.checker(BuildMode::Release).check(&contingency);
        assert!(!report.passed());
        assert!(report.differences() >= 1);
        let messages: Vec<_> = report
            .outcomes
            .iter()
            .flat_map(|o| o.diagnostics.issues.iter())
            .filter(|issue| issue.severity == dfl_core::Severity::Error)
            .map(|issue| issue.message.clone())
            .collect();
        assert!(messages.iter().any(|m| m.contains("L1") && m.contains("p1")), "{messages:?}");
    }

    #[test]
    fn three_winding_transformer_needs_all_windings() {
        let fx = Fixture::new();
        fx.simulated("CONT_T3", &["T3_1", "T3_2"], &["T3_1", "T3_2", "T3_3"], FINAL_STATE);
        let contingency = Contingency::new(
            "CONT_T3",
            vec![Element::new("T3", ElementType::ThreeWindingsTransformer)],
        );

        let report = fx.checker(BuildMode::Release).check(&contingency);
        assert!(!report.passed());
        assert_eq!(report.differences(), 1);
        let failed: Vec<_> = report.outcomes.iter().filter(|o| !o.passed()).collect();
        assert_eq!(failed[0].subject.as_deref(), Some("T3_3"));
        assert_eq!(failed[0].kind, CheckKind::ModelDeclaration);
    }

    #[test]
    fn debug_mode_checks_timeline_for_every_key() {
        let fx = Fixture::new();
        fx.simulated("CONT_1", &["L1"], &["L1"], FINAL_STATE);
        let contingency = Contingency::new("CONT_1", vec![Element::new("L1", ElementType::Line)]);

        let report = fx.checker(BuildMode::Debug).check(&contingency);
        let timeline: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.kind == CheckKind::Timeline)
            .collect();
        assert_eq!(timeline.len(), 1);
        assert!(!timeline[0].passed());

        let artifacts = fx.layout.contingency("model", "CONT_1");
        fs::create_dir_all(artifacts.timeline_xml.parent().unwrap()).unwrap();
        fs::write(
            &artifacts.timeline_xml,
            r#"<timeline><event time="10" modelName="L1" message="BRANCH : opening both sides"/></timeline>"#,
        )
        .unwrap();
        assert!(fx.checker(BuildMode::Debug).check(&contingency).passed());
    }

    #[test]
    fn invalid_contingency_must_not_leave_model_files() {
        let fx = Fixture::new();
        let contingency = Contingency::new("CONT_2", vec![Element::new("L2", ElementType::Line)]);
        let checker = fx.checker(BuildMode::Release);

        let report = checker.check(&contingency);
        assert_eq!(report.validity, Validity::Invalid);
        assert!(report.passed());

        let artifacts = fx.layout.contingency("model", "CONT_2");
        fs::write(&artifacts.par, par(&["L2"])).unwrap();
        let report = checker.check(&contingency);
        assert!(!report.passed());
        assert_eq!(report.differences(), 1);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[test]
    fn every_contingency_is_checked() {
        let fx = Fixture::new();
        fx.simulated("CONT_1", &["L1"], &["L1"], FINAL_STATE);
        fs::write(fx.layout.contingency("model", "CONT_2").dyd, dyd(&["L2"])).unwrap();
        let registry = vec![
            Contingency::new("CONT_2", vec![Element::new("L2", ElementType::Line)]),
            Contingency::new("CONT_1", vec![Element::new("L1", ElementType::Line)]),
        ];

        let summary = fx.checker(BuildMode::Release).check_all(&registry);
        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.differences(), 1);
        let failed: Vec<_> = summary.failed().map(|r| r.contingency_id.as_str()).collect();
        assert_eq!(failed, vec!["CONT_2"]);
    }

    #[test]
    fn release_security_analysis_skips_final_state_unless_chosen() {
        let fx = Fixture::new();
        fx.simulated("CONT_1", &["L1"], &["L1"], &FINAL_STATE.replace(r#"p1="0" q1"#, r#"p1="0.0" q1"#));
        let contingency = Contingency::new("CONT_1", vec![Element::new("L1", ElementType::Line)]);

        let default_run = RunConfiguration::new(BuildMode::Release, SimulationKind::SecurityAnalysis);
        let report = fx.checker_for(default_run).check(&contingency);
        assert!(report.passed(), "{:?}", report.outcomes);
        assert!(report.outcomes.iter().all(|o| o.kind != CheckKind::FinalState));

        let chosen = RunConfiguration::new(BuildMode::Release, SimulationKind::SecurityAnalysis)
            .with_chosen_outputs([OutputClass::SteadyState]);
        let report = fx.checker_for(chosen).check(&contingency);
        assert_eq!(report.differences(), 1);
        let failed: Vec<_> = report.outcomes.iter().filter(|o| !o.passed()).collect();
        assert_eq!(failed[0].kind, CheckKind::FinalState);
    }
}
