//! Contingency registry loading.
//!
//! ```json
//! { "contingencies": [ { "id": "CONT_1", "elements": [ { "id": "L1", "type": "LINE" } ] } ] }
//! ```

use dfl_core::{Contingency, DflError, DflResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct RegistryFile {
    contingencies: Vec<Contingency>,
}

/// Default registry location for a test: `{root}/res/contingencies_{test}.json`.
pub fn default_registry_path(root: &Path, test_name: &str) -> PathBuf {
    root.join("res")
        .join(format!("contingencies_{test_name}.json"))
}

/// Load the declared contingencies, in file order.
pub fn load_registry(path: &Path) -> DflResult<Vec<Contingency>> {
    let data = fs::read_to_string(path).map_err(|err| {
        DflError::MalformedRegistry(format!(
            "reading contingency registry '{}': {err}",
            path.display()
        ))
    })?;
    parse_registry(&data).map_err(|err| match err {
        DflError::MalformedRegistry(msg) => {
            DflError::MalformedRegistry(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

pub fn parse_registry(data: &str) -> DflResult<Vec<Contingency>> {
    let file: RegistryFile = serde_json::from_str(data)
        .map_err(|err| DflError::MalformedRegistry(err.to_string()))?;
    let mut seen = HashSet::new();
    for contingency in &file.contingencies {
        if contingency.id.trim().is_empty() {
            return Err(DflError::MalformedRegistry(
                "contingency id cannot be empty".into(),
            ));
        }
        if !seen.insert(contingency.id.as_str()) {
            return Err(DflError::MalformedRegistry(format!(
                "duplicate contingency id '{}'",
                contingency.id
            )));
        }
    }
    Ok(file.contingencies)
}
