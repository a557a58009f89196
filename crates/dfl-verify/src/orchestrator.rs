use crate::outcome::{total_differences, CheckKind, CheckOutcome};
use anyhow::{Context, Result};
use dfl_io::layout::AGGREGATED_RESULTS_FILE;
use dfl_io::text::{compare_line_files, list_files_with_extensions, list_subdirectories};
use dfl_io::{
    ConstraintsComparator, FinalStateComparator, LineComparison, OutputClass, PathNormalizer,
    RunConfiguration, TestLayout, Tolerance, ToleranceComparator,
};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MODEL_EXTENSIONS: [&str; 2] = ["dyd", "par"];

/// Output classes compared per scenario, in comparison order.
const SCENARIO_CLASSES: [OutputClass; 3] = [
    OutputClass::SteadyState,
    OutputClass::Constraints,
    OutputClass::LostEquipment,
];

/// Everything one reference comparison needs.
pub struct CompareConfig {
    pub layout: TestLayout,
    pub run: RunConfiguration,
    pub normalizer: PathNormalizer,
    pub final_state: Box<dyn ToleranceComparator>,
    pub constraints: Box<dyn ToleranceComparator>,
    /// Worker threads for scenarios; 0 means one per CPU.
    pub threads: usize,
}

impl CompareConfig {
    /// Default comparators with default tolerances, one thread.
    pub fn new(layout: TestLayout, run: RunConfiguration) -> Self {
        Self::with_tolerance(layout, run, Tolerance::default())
    }

    pub fn with_tolerance(layout: TestLayout, run: RunConfiguration, tolerance: Tolerance) -> Self {
        Self {
            layout,
            run,
            normalizer: PathNormalizer::default(),
            final_state: Box::new(FinalStateComparator::new(tolerance)),
            constraints: Box::new(ConstraintsComparator::new(tolerance)),
            threads: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub outcomes: Vec<CheckOutcome>,
}

impl ScenarioReport {
    pub fn differences(&self) -> usize {
        total_differences(&self.outcomes)
    }
}

/// Every check of a comparison run, in the order they were made.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonSummary {
    pub scenarios: Vec<ScenarioReport>,
    /// Test-level `.dyd`/`.par` files and aggregated results.
    pub test_level: Vec<CheckOutcome>,
    pub completeness: Vec<CheckOutcome>,
}

impl ComparisonSummary {
    pub fn outcomes(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.scenarios
            .iter()
            .flat_map(|s| s.outcomes.iter())
            .chain(self.test_level.iter())
            .chain(self.completeness.iter())
    }

    pub fn differences(&self) -> usize {
        total_differences(self.outcomes())
    }
}

/// Compare the results tree of a test against its reference tree.
///
/// Every content problem, and every directory that cannot be listed, is a
/// counted [`CheckOutcome`]; only a thread pool failure is an error.
pub fn run_comparison(config: &CompareConfig) -> Result<ComparisonSummary> {
    let layout = &config.layout;
    let mut test_level = Vec::new();
    let scenarios = match list_subdirectories(&layout.results_root) {
        Ok(scenarios) => scenarios,
        Err(err) => {
            test_level.push(listing_failure("", &layout.results_root, &err));
            Vec::new()
        }
    };
    info!(
        "comparing {} scenario(s) of {} against {}",
        scenarios.len(),
        layout.results_root.display(),
        layout.reference_root.display()
    );

    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for scenario comparison")?;

    // collect keeps scenario order regardless of the thread count
    let scenarios = pool.install(|| {
        scenarios
            .par_iter()
            .map(|scenario| compare_scenario(scenario, config))
            .collect::<Vec<_>>()
    });

    test_level.extend(compare_model_files(
        &config.normalizer,
        "",
        &layout.results_root,
        &layout.reference_root,
    ));
    let reference_aggregated = layout.reference_root.join(AGGREGATED_RESULTS_FILE);
    let result_aggregated = layout.results_root.join(AGGREGATED_RESULTS_FILE);
    if reference_aggregated.is_file() && result_aggregated.is_file() {
        test_level.push(compare_text(
            "",
            CheckKind::AggregatedResults,
            &result_aggregated,
            &reference_aggregated,
        ));
    }

    let completeness = completeness_pass(config);
    let summary = ComparisonSummary {
        scenarios,
        test_level,
        completeness,
    };
    info!("{} difference(s) with reference", summary.differences());
    Ok(summary)
}

fn compare_scenario(scenario: &str, config: &CompareConfig) -> ScenarioReport {
    debug!("comparing scenario {scenario}");
    let layout = &config.layout;
    let mut outcomes = Vec::new();

    if config.run.generates(OutputClass::SteadyState) {
        outcomes.extend(compare_tolerant(
            scenario,
            CheckKind::FinalState,
            config.final_state.as_ref(),
            &layout.result_output(scenario, OutputClass::SteadyState),
            &layout.reference_output(scenario, OutputClass::SteadyState),
        ));
    }

    outcomes.extend(compare_model_files(
        &config.normalizer,
        scenario,
        &layout.results_scenario(scenario),
        &layout.reference_scenario(scenario),
    ));

    if config.run.generates(OutputClass::Constraints) {
        outcomes.extend(compare_tolerant(
            scenario,
            CheckKind::Constraints,
            config.constraints.as_ref(),
            &layout.result_output(scenario, OutputClass::Constraints),
            &layout.reference_output(scenario, OutputClass::Constraints),
        ));
    }

    if config.run.generates(OutputClass::LostEquipment) {
        let result = layout.result_output(scenario, OutputClass::LostEquipment);
        let reference = layout.reference_output(scenario, OutputClass::LostEquipment);
        if result.is_file() && reference.is_file() {
            outcomes.push(compare_text(scenario, CheckKind::LostEquipment, &result, &reference));
        }
    }

    ScenarioReport {
        scenario: scenario.to_string(),
        outcomes,
    }
}

fn listing_failure(scenario: &str, dir: &Path, err: &anyhow::Error) -> CheckOutcome {
    CheckOutcome::new(scenario, CheckKind::Completeness, dir).fail(format!("{err:#}"))
}

/// `None` when there is nothing to compare; a missing result next to an
/// existing reference is left to the completeness pass.
fn compare_tolerant(
    scenario: &str,
    kind: CheckKind,
    comparator: &dyn ToleranceComparator,
    result: &Path,
    reference: &Path,
) -> Option<CheckOutcome> {
    if !result.is_file() {
        return None;
    }
    let mut outcome = CheckOutcome::new(scenario, kind, result);
    if !reference.is_file() {
        outcome.diagnostics.add_warning_with_path(
            kind.as_str(),
            &format!("{} of {scenario} not checked: no reference", kind.label()),
            reference,
        );
        return Some(outcome);
    }

    match comparator.compare(result, reference) {
        Ok(diff) if diff.is_identical() => {
            outcome.diagnostics.add_info(kind.as_str(), "No difference");
        }
        Ok(diff) => {
            outcome.differences = diff.count;
            outcome.diagnostics.add_error_with_path(
                kind.as_str(),
                &format!(
                    "{} differences with reference ({}):\n{}",
                    diff.count,
                    comparator.name(),
                    diff.message
                ),
                result,
            );
        }
        Err(err) => outcome.record_failure(&format!("{} comparison failed: {err}", comparator.name())),
    }
    Some(outcome)
}

/// Compare each `.dyd`/`.par` of `reference_dir` with its namesake in
/// `results_dir`, install prefixes neutralized.
fn compare_model_files(
    normalizer: &PathNormalizer,
    scenario: &str,
    results_dir: &Path,
    reference_dir: &Path,
) -> Vec<CheckOutcome> {
    let references = match list_files_with_extensions(reference_dir, &MODEL_EXTENSIONS) {
        Ok(references) => references,
        Err(err) => return vec![listing_failure(scenario, reference_dir, &err)],
    };
    let mut outcomes = Vec::new();
    for reference in references {
        let Some(file_name) = reference.file_name() else {
            continue;
        };
        let result = results_dir.join(file_name);
        if !result.is_file() {
            continue;
        }
        let kind = model_file_kind(&reference);
        let outcome = CheckOutcome::new(scenario, kind, &result);
        outcomes.push(match normalizer.files_match(&result, &reference) {
            Ok(true) => outcome,
            Ok(false) => outcome.fail(format!(
                "{} file {} different from reference file {}",
                kind.label(),
                result.display(),
                reference.display()
            )),
            Err(err) => outcome.fail(format!("{err:#}")),
        });
    }
    outcomes
}

fn model_file_kind(path: &Path) -> CheckKind {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("dyd") => CheckKind::ModelDeclaration,
        _ => CheckKind::Parameters,
    }
}

fn compare_text(scenario: &str, kind: CheckKind, result: &Path, reference: &Path) -> CheckOutcome {
    let outcome = CheckOutcome::new(scenario, kind, result);
    match compare_line_files(result, reference) {
        Ok(LineComparison::Identical) => outcome,
        Ok(LineComparison::Differs {
            line,
            result: got,
            reference: expected,
        }) => outcome.fail(format!(
            "{} file {} differs from {} at line {line}: {} / reference {}",
            kind.label(),
            result.display(),
            reference.display(),
            got.as_deref().unwrap_or("<end of file>"),
            expected.as_deref().unwrap_or("<end of file>")
        )),
        Err(err) => outcome.fail(format!("{err:#}")),
    }
}

/// Every reference artifact of an applicable class needs a results
/// counterpart. Each absence counts once.
///
/// Every directory listed here was already listed by a content comparison,
/// which counted any listing failure, so failures are skipped.
fn completeness_pass(config: &CompareConfig) -> Vec<CheckOutcome> {
    let layout = &config.layout;
    let mut outcomes = Vec::new();

    let mut required = Vec::new();
    for reference in list_model_files(&layout.reference_root) {
        if let Some(name) = reference.file_name() {
            required.push((String::new(), reference.clone(), layout.results_root.join(name)));
        }
    }
    required.push((
        String::new(),
        layout.reference_root.join(AGGREGATED_RESULTS_FILE),
        layout.results_root.join(AGGREGATED_RESULTS_FILE),
    ));

    for scenario in list_subdirectories(&layout.reference_root).unwrap_or_default() {
        let results_dir = layout.results_scenario(&scenario);
        if !results_dir.is_dir() {
            outcomes.push(
                CheckOutcome::new(&scenario, CheckKind::Completeness, &results_dir)
                    .fail(format!("Result folder {} not found", results_dir.display())),
            );
            continue;
        }
        for class in SCENARIO_CLASSES {
            if config.run.generates(class) {
                required.push((
                    scenario.clone(),
                    layout.reference_output(&scenario, class),
                    layout.result_output(&scenario, class),
                ));
            }
        }
        for reference in list_model_files(&layout.reference_scenario(&scenario)) {
            if let Some(name) = reference.file_name() {
                required.push((scenario.clone(), reference.clone(), results_dir.join(name)));
            }
        }
    }

    for (scenario, reference, result) in required {
        if reference.is_file() && !result.is_file() {
            outcomes.push(
                CheckOutcome::new(&scenario, CheckKind::Completeness, &result).fail(format!(
                    "Result file {} not found (reference {})",
                    result.display(),
                    reference.display()
                )),
            );
        }
    }
    outcomes
}

fn list_model_files(dir: &Path) -> Vec<PathBuf> {
    list_files_with_extensions(dir, &MODEL_EXTENSIONS).unwrap_or_default()
}
