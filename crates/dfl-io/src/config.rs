//! Run configuration: which artifact classes a run is expected to produce.
//!
//! Debug builds of the simulator write every output class. Release builds
//! write the classes implied by the simulation kind plus whatever the run's
//! configuration file lists under `dfl-config.ChosenOutputs`.

use dfl_core::{DflError, DflResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "Debug",
            BuildMode::Release => "Release",
        }
    }
}

impl FromStr for BuildMode {
    type Err = DflError;

    fn from_str(s: &str) -> DflResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildMode::Debug),
            "release" => Ok(BuildMode::Release),
            other => Err(DflError::Config(format!(
                "unknown build type '{other}'; use 'Debug' or 'Release'"
            ))),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationKind {
    SteadyStateCalculation,
    SecurityAnalysis,
}

impl FromStr for SimulationKind {
    type Err = DflError;

    fn from_str(s: &str) -> DflResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steady-state" | "steady-state-calculation" | "ssc" => {
                Ok(SimulationKind::SteadyStateCalculation)
            }
            "security-analysis" | "sa" => Ok(SimulationKind::SecurityAnalysis),
            other => Err(DflError::Config(format!(
                "unknown simulation kind '{other}'; use 'steady-state' or 'security-analysis'"
            ))),
        }
    }
}

/// Optional output classes a run may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputClass {
    SteadyState,
    Constraints,
    LostEquipment,
    Timeline,
}

impl OutputClass {
    pub const ALL: [OutputClass; 4] = [
        OutputClass::SteadyState,
        OutputClass::Constraints,
        OutputClass::LostEquipment,
        OutputClass::Timeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputClass::SteadyState => "STEADYSTATE",
            OutputClass::Constraints => "CONSTRAINTS",
            OutputClass::LostEquipment => "LOSTEQ",
            OutputClass::Timeline => "TIMELINE",
        }
    }
}

impl FromStr for OutputClass {
    type Err = DflError;

    fn from_str(s: &str) -> DflResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STEADYSTATE" => Ok(OutputClass::SteadyState),
            "CONSTRAINTS" => Ok(OutputClass::Constraints),
            "LOSTEQ" => Ok(OutputClass::LostEquipment),
            "TIMELINE" => Ok(OutputClass::Timeline),
            other => Err(DflError::Config(format!(
                "chosen output '{other}' does not exist"
            ))),
        }
    }
}

impl fmt::Display for OutputClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunConfiguration {
    pub mode: BuildMode,
    pub kind: SimulationKind,
    /// Classes listed by the configuration file (release defaults excluded).
    pub chosen_outputs: BTreeSet<OutputClass>,
}

impl RunConfiguration {
    pub fn new(mode: BuildMode, kind: SimulationKind) -> Self {
        Self {
            mode,
            kind,
            chosen_outputs: BTreeSet::new(),
        }
    }

    pub fn with_chosen_outputs(mut self, outputs: impl IntoIterator<Item = OutputClass>) -> Self {
        self.chosen_outputs.extend(outputs);
        self
    }

    /// Whether the run is expected to have produced artifacts of `class`.
    pub fn generates(&self, class: OutputClass) -> bool {
        match self.mode {
            BuildMode::Debug => true,
            BuildMode::Release => {
                self.release_defaults().contains(&class) || self.chosen_outputs.contains(&class)
            }
        }
    }

    pub fn generated_classes(&self) -> Vec<OutputClass> {
        OutputClass::ALL
            .into_iter()
            .filter(|class| self.generates(*class))
            .collect()
    }

    fn release_defaults(&self) -> &'static [OutputClass] {
        match self.kind {
            SimulationKind::SteadyStateCalculation => &[OutputClass::SteadyState],
            SimulationKind::SecurityAnalysis => {
                &[OutputClass::Constraints, OutputClass::LostEquipment]
            }
        }
    }
}

/// Load a run configuration file and merge its chosen outputs.
pub fn load_run_configuration(
    path: &Path,
    mode: BuildMode,
    kind: SimulationKind,
) -> DflResult<RunConfiguration> {
    let data = fs::read_to_string(path).map_err(|err| {
        DflError::Config(format!(
            "reading run configuration '{}': {err}",
            path.display()
        ))
    })?;
    let chosen = parse_chosen_outputs(&data, kind).map_err(|err| {
        DflError::Config(format!("{}: {err}", path.display()))
    })?;
    Ok(RunConfiguration::new(mode, kind).with_chosen_outputs(chosen))
}

/// Extract `dfl-config.ChosenOutputs`; in security analysis
/// `dfl-config.sa.ChosenOutputs` wins when present.
pub fn parse_chosen_outputs(data: &str, kind: SimulationKind) -> DflResult<Vec<OutputClass>> {
    let root: Value = serde_json::from_str(data)
        .map_err(|err| DflError::Config(format!("parsing run configuration: {err}")))?;
    let Some(section) = root.get("dfl-config") else {
        return Ok(Vec::new());
    };
    let sa_outputs = match kind {
        SimulationKind::SecurityAnalysis => section.get("sa").and_then(|sa| sa.get("ChosenOutputs")),
        SimulationKind::SteadyStateCalculation => None,
    };
    let Some(outputs) = sa_outputs.or_else(|| section.get("ChosenOutputs")) else {
        return Ok(Vec::new());
    };
    let entries = outputs
        .as_array()
        .ok_or_else(|| DflError::Config("ChosenOutputs must be an array".into()))?;
    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .ok_or_else(|| DflError::Config(format!("chosen output {entry} is not a string")))
                .and_then(OutputClass::from_str)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn build_mode_parsing_is_case_insensitive() {
        assert_eq!("Debug".parse::<BuildMode>().unwrap(), BuildMode::Debug);
        assert_eq!("RELEASE".parse::<BuildMode>().unwrap(), BuildMode::Release);
        let err = "RelWithDebInfo".parse::<BuildMode>().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn debug_generates_everything() {
        let config = RunConfiguration::new(BuildMode::Debug, SimulationKind::SecurityAnalysis);
        assert_eq!(config.generated_classes(), OutputClass::ALL.to_vec());
    }

    #[test]
    fn release_security_analysis_defaults() {
        let config = RunConfiguration::new(BuildMode::Release, SimulationKind::SecurityAnalysis);
        assert!(config.generates(OutputClass::Constraints));
        assert!(config.generates(OutputClass::LostEquipment));
        assert!(!config.generates(OutputClass::SteadyState));
        assert!(!config.generates(OutputClass::Timeline));
    }

    #[test]
    fn release_chosen_outputs_add_to_defaults() {
        let config = RunConfiguration::new(BuildMode::Release, SimulationKind::SecurityAnalysis)
            .with_chosen_outputs([OutputClass::SteadyState]);
        assert!(config.generates(OutputClass::SteadyState));
        assert!(config.generates(OutputClass::Constraints));
    }

    #[test]
    fn chosen_outputs_from_nested_key() {
        let data = r#"{"dfl-config": {"ChosenOutputs": ["steadystate", "TIMELINE"]}}"#;
        let outputs = parse_chosen_outputs(data, SimulationKind::SteadyStateCalculation).unwrap();
        assert_eq!(outputs, vec![OutputClass::SteadyState, OutputClass::Timeline]);
    }

    #[test]
    fn security_analysis_key_takes_precedence() {
        let data = r#"{"dfl-config": {
            "ChosenOutputs": ["STEADYSTATE"],
            "sa": {"ChosenOutputs": ["LOSTEQ"]}
        }}"#;
        let sa = parse_chosen_outputs(data, SimulationKind::SecurityAnalysis).unwrap();
        assert_eq!(sa, vec![OutputClass::LostEquipment]);
        let ssc = parse_chosen_outputs(data, SimulationKind::SteadyStateCalculation).unwrap();
        assert_eq!(ssc, vec![OutputClass::SteadyState]);
    }

    #[test]
    fn missing_section_means_no_extra_outputs() {
        let outputs = parse_chosen_outputs(r#"{"other": 1}"#, SimulationKind::SecurityAnalysis)
            .unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn unknown_chosen_output_is_a_configuration_error() {
        let data = r#"{"dfl-config": {"ChosenOutputs": ["DUMPSTATE"]}}"#;
        let err = parse_chosen_outputs(data, SimulationKind::SecurityAnalysis).unwrap_err();
        assert!(matches!(err, DflError::Config(_)));
        assert!(err.to_string().contains("DUMPSTATE"));
    }

    #[test]
    fn load_run_configuration_merges_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"dfl-config": {"ChosenOutputs": ["TIMELINE"]}}"#).unwrap();
        let config =
            load_run_configuration(&path, BuildMode::Release, SimulationKind::SecurityAnalysis)
                .unwrap();
        assert!(config.generates(OutputClass::Timeline));
        assert!(!config.generates(OutputClass::SteadyState));
    }
}
