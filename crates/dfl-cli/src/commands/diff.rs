use std::path::Path;

use anyhow::Result;
use dfl_cli::cli::RunArgs;
use dfl_cli::load_settings;
use dfl_io::{PathNormalizer, TestLayout};
use dfl_verify::{run_comparison, CompareConfig};

use super::{print_outcome, run_configuration, write_report_if_requested};

pub fn handle(
    root: &Path,
    testdir: &str,
    install_prefix: Option<&str>,
    reference_prefix: Option<&str>,
    threads: Option<usize>,
    run: &RunArgs,
) -> Result<usize> {
    let settings = load_settings(run.settings.as_deref())?;
    let run_config = run_configuration(run)?;

    let mut config = CompareConfig::with_tolerance(
        TestLayout::new(root, testdir),
        run_config,
        settings.tolerance.tolerance(),
    );
    config.normalizer = PathNormalizer::new(
        install_prefix
            .map(str::to_string)
            .or(settings.paths.install_prefix),
        reference_prefix
            .map(str::to_string)
            .or(settings.paths.reference_prefix),
    );
    config.threads = threads.unwrap_or(settings.run.threads);

    let summary = run_comparison(&config)?;
    for scenario in &summary.scenarios {
        if run.verbose || scenario.differences() > 0 {
            println!("{}: {} difference(s)", scenario.scenario, scenario.differences());
        }
        for outcome in &scenario.outcomes {
            print_outcome(outcome, run.verbose);
        }
    }
    for outcome in summary.test_level.iter().chain(summary.completeness.iter()) {
        print_outcome(outcome, run.verbose);
    }

    let differences = summary.differences();
    let unchecked: usize = summary
        .outcomes()
        .map(|outcome| outcome.diagnostics.warning_count())
        .sum();
    println!(
        "{}: {} scenario(s) compared, {} difference(s) with reference, {} file(s) without reference",
        testdir,
        summary.scenarios.len(),
        differences,
        unchecked
    );
    Ok(differences + write_report_if_requested(run, "diff", summary.outcomes()))
}
