//! Optional TOML settings shared by the verification commands.
//!
//! ```toml
//! [tolerance]
//! atol = 1e-5
//! rtol = 1e-5
//!
//! [paths]
//! install_prefix = "/opt/dynaflow-launcher"
//! reference_prefix = "/home/ci/dynaflow-launcher"
//!
//! [timeline]
//! event_time = "10"
//!
//! [run]
//! threads = 1
//! ```

use dfl_core::{DflError, DflResult};
use dfl_io::Tolerance;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub tolerance: ToleranceSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub timeline: TimelineSettings,
    #[serde(default)]
    pub run: RunSettings,
}

/// Comparator tolerance: `|a - b| <= atol + rtol * |reference|`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceSettings {
    #[serde(default = "default_atol")]
    pub atol: f64,
    #[serde(default = "default_rtol")]
    pub rtol: f64,
}

impl Default for ToleranceSettings {
    fn default() -> Self {
        Self {
            atol: default_atol(),
            rtol: default_rtol(),
        }
    }
}

impl ToleranceSettings {
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            atol: self.atol,
            rtol: self.rtol,
        }
    }
}

fn default_atol() -> f64 {
    Tolerance::default().atol
}

fn default_rtol() -> f64 {
    Tolerance::default().rtol
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathSettings {
    #[serde(default)]
    pub install_prefix: Option<String>,
    #[serde(default)]
    pub reference_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSettings {
    #[serde(default = "default_event_time")]
    pub event_time: String,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            event_time: default_event_time(),
        }
    }
}

fn default_event_time() -> String {
    dfl_io::DEFAULT_EVENT_TIME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Worker threads for scenario comparison (0 = one per CPU)
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

fn default_threads() -> usize {
    1
}

/// Defaults when `path` is `None`; a given file must exist and parse, or
/// the invocation is aborted with a configuration error.
pub fn load_settings(path: Option<&Path>) -> DflResult<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let contents = std::fs::read_to_string(path)
        .map_err(|err| DflError::Config(format!("reading settings '{}': {err}", path.display())))?;
    toml::from_str(&contents)
        .map_err(|err| DflError::Config(format!("parsing settings '{}': {err}", path.display())))
}
