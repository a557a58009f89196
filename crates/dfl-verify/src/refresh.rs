//! Promote final states that drifted from the reference.

use anyhow::{Context, Result};
use dfl_io::text::list_subdirectories;
use dfl_io::{OutputClass, TestLayout, ToleranceComparator};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Copy every results final state that differs from its reference over the
/// reference. Scenarios without a reference final state are left alone.
///
/// Returns the refreshed reference paths, in scenario order.
pub fn refresh_references(layout: &TestLayout, comparator: &dyn ToleranceComparator) -> Result<Vec<PathBuf>> {
    let mut refreshed = Vec::new();
    for scenario in list_subdirectories(&layout.results_root)? {
        let result = layout.result_output(&scenario, OutputClass::SteadyState);
        let reference = layout.reference_output(&scenario, OutputClass::SteadyState);
        if !result.is_file() || !reference.is_file() {
            debug!("{scenario}: nothing to refresh");
            continue;
        }
        let diff = match comparator.compare(&result, &reference) {
            Ok(diff) => diff,
            Err(err) => {
                warn!("{scenario}: final state not compared, reference kept: {err}");
                continue;
            }
        };
        if diff.is_identical() {
            continue;
        }
        fs::copy(&result, &reference).with_context(|| {
            format!(
                "copying '{}' over reference '{}'",
                result.display(),
                reference.display()
            )
        })?;
        info!(
            "updated reference {} ({} difference(s))",
            reference.display(),
            diff.count
        );
        refreshed.push(reference);
    }
    Ok(refreshed)
}
