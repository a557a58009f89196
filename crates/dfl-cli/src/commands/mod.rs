use anyhow::Result;
use dfl_cli::cli::RunArgs;
use dfl_core::Severity;
use dfl_io::{load_run_configuration, BuildMode, RunConfiguration, SimulationKind};
use dfl_verify::{write_report, CheckOutcome, VerificationReport};
use tracing::{debug, error, info};

pub mod completions;
pub mod contingencies;
pub mod diff;
pub mod update_reference;

/// Build mode, simulation kind and chosen outputs from the command line.
pub fn run_configuration(run: &RunArgs) -> Result<RunConfiguration> {
    let mode: BuildMode = run.build_type.parse()?;
    let kind: SimulationKind = run.kind.parse()?;
    let config = match &run.config {
        Some(path) => load_run_configuration(path, mode, kind)?,
        None => RunConfiguration::new(mode, kind),
    };
    let classes: Vec<_> = config
        .generated_classes()
        .iter()
        .map(|class| class.as_str())
        .collect();
    debug!("{} {:?} run, checking {}", mode, kind, classes.join(", "));
    Ok(config)
}

/// Print a check's lines; progress lines only when `verbose`.
pub fn print_outcome(outcome: &CheckOutcome, verbose: bool) {
    for issue in &outcome.diagnostics.issues {
        if verbose || issue.severity != Severity::Info {
            println!("{issue}");
        }
    }
}

/// Write the JSON report when `--report` was given. Returns the failures to
/// add to the count: 1 when the report could not be written.
pub fn write_report_if_requested<'a>(
    run: &RunArgs,
    command: &str,
    outcomes: impl IntoIterator<Item = &'a CheckOutcome>,
) -> usize {
    let Some(path) = &run.report else {
        return 0;
    };
    let report = VerificationReport::new(command, outcomes);
    match write_report(path, &report) {
        Ok(()) => {
            info!("report written to {}", path.display());
            0
        }
        Err(err) => {
            error!("{:#}", err);
            1
        }
    }
}
