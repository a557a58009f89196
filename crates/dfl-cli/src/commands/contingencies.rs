use std::path::{Path, PathBuf};

use anyhow::Result;
use dfl_cli::cli::RunArgs;
use dfl_cli::load_settings;
use dfl_io::{default_registry_path, load_registry, TestLayout};
use dfl_verify::ContingencyChecker;
use tracing::info;

use super::{print_outcome, run_configuration, write_report_if_requested};

pub fn handle(
    root: &Path,
    test: &str,
    input_model: &str,
    registry: Option<&PathBuf>,
    event_time: Option<&str>,
    run: &RunArgs,
) -> Result<usize> {
    let settings = load_settings(run.settings.as_deref())?;
    let config = run_configuration(run)?;

    let registry_path = registry
        .cloned()
        .unwrap_or_else(|| default_registry_path(root, test));
    let contingencies = load_registry(&registry_path)?;
    info!(
        "checking {} contingencies of {} from {}",
        contingencies.len(),
        test,
        registry_path.display()
    );

    let event_time = event_time.unwrap_or(&settings.timeline.event_time);
    let checker = ContingencyChecker::new(TestLayout::new(root, test), input_model, config)
        .with_event_time(event_time);
    let summary = checker.check_all(&contingencies);

    for report in &summary.reports {
        let verdict = if report.passed() { "OK" } else { "FAILED" };
        println!(
            "{} ({}): {}",
            report.contingency_id,
            report.validity.as_str(),
            verdict
        );
        for outcome in &report.outcomes {
            print_outcome(outcome, run.verbose);
        }
    }

    let differences = summary.differences();
    let failed = summary.failed().count();
    println!(
        "{} contingencies checked, {} failed, {} failed check(s)",
        summary.reports.len(),
        failed,
        differences
    );
    Ok(differences + write_report_if_requested(run, "contingencies", summary.outcomes()))
}
