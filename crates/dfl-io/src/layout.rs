//! Artifact path conventions of a test run.
//!
//! ```text
//! {root}/resultsTestsTmp/{test}/
//!   {model}-{contingency}.dyd
//!   {model}-{contingency}.par
//!   aggregatedResults.xml
//!   timeLine/timeline_{contingency}.xml
//!   {scenario}/outputs/finalState/outputIIDM.xml
//!   {scenario}/outputs/constraints/constraints.xml
//!   {scenario}/outputs/lostEquipments/lostEquipments.xml
//!   {scenario}/outputs/timeLine/timeline.log        (legacy text timeline)
//! {root}/reference/{test}/
//!   {scenario}/outputIIDM.xml
//!   {scenario}/constraints.xml
//!   {scenario}/lostEquipments.xml
//! ```

use crate::config::OutputClass;
use std::path::{Path, PathBuf};

pub const RESULTS_DIR: &str = "resultsTestsTmp";
pub const REFERENCE_DIR: &str = "reference";
pub const AGGREGATED_RESULTS_FILE: &str = "aggregatedResults.xml";

/// Results and reference roots of one test.
#[derive(Debug, Clone)]
pub struct TestLayout {
    pub results_root: PathBuf,
    pub reference_root: PathBuf,
}

impl TestLayout {
    pub fn new(root: &Path, test_name: &str) -> Self {
        Self {
            results_root: root.join(RESULTS_DIR).join(test_name),
            reference_root: root.join(REFERENCE_DIR).join(test_name),
        }
    }

    pub fn results_scenario(&self, scenario: &str) -> PathBuf {
        self.results_root.join(scenario)
    }

    pub fn reference_scenario(&self, scenario: &str) -> PathBuf {
        self.reference_root.join(scenario)
    }

    /// Results-side file for an output class of a scenario.
    pub fn result_output(&self, scenario: &str, class: OutputClass) -> PathBuf {
        let outputs = self.results_scenario(scenario).join("outputs");
        match class {
            OutputClass::SteadyState => outputs.join("finalState").join("outputIIDM.xml"),
            OutputClass::Constraints => outputs.join("constraints").join("constraints.xml"),
            OutputClass::LostEquipment => {
                outputs.join("lostEquipments").join("lostEquipments.xml")
            }
            OutputClass::Timeline => outputs.join("timeLine").join("timeline.log"),
        }
    }

    /// Reference-side file for an output class of a scenario.
    pub fn reference_output(&self, scenario: &str, class: OutputClass) -> PathBuf {
        let dir = self.reference_scenario(scenario);
        match class {
            OutputClass::SteadyState => dir.join("outputIIDM.xml"),
            OutputClass::Constraints => dir.join("constraints.xml"),
            OutputClass::LostEquipment => dir.join("lostEquipments.xml"),
            OutputClass::Timeline => dir.join("timeline.log"),
        }
    }

    pub fn contingency(&self, input_model: &str, contingency_id: &str) -> ContingencyArtifacts {
        ContingencyArtifacts::new(&self.results_root, input_model, contingency_id)
    }
}

/// Paths of every artifact a contingency may produce.
#[derive(Debug, Clone)]
pub struct ContingencyArtifacts {
    pub output_dir: PathBuf,
    pub dyd: PathBuf,
    pub par: PathBuf,
    pub timeline_xml: PathBuf,
    pub timeline_log: PathBuf,
    pub final_state: PathBuf,
}

impl ContingencyArtifacts {
    pub fn new(results_root: &Path, input_model: &str, contingency_id: &str) -> Self {
        let output_dir = results_root.join(contingency_id);
        let outputs = output_dir.join("outputs");
        Self {
            dyd: results_root.join(format!("{input_model}-{contingency_id}.dyd")),
            par: results_root.join(format!("{input_model}-{contingency_id}.par")),
            timeline_xml: results_root
                .join("timeLine")
                .join(format!("timeline_{contingency_id}.xml")),
            timeline_log: outputs.join("timeLine").join("timeline.log"),
            final_state: outputs.join("finalState").join("outputIIDM.xml"),
            output_dir,
        }
    }

    /// Timeline to read: the XML event stream when present, else the legacy log.
    pub fn timeline(&self) -> Option<&Path> {
        [&self.timeline_xml, &self.timeline_log]
            .into_iter()
            .find(|path| path.is_file())
            .map(PathBuf::as_path)
    }
}
