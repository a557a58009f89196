//! Verification of a launcher run: contingency postconditions and
//! comparison against reference outputs.

pub mod contingencies;
pub mod matchers;
pub mod orchestrator;
pub mod outcome;
pub mod refresh;
pub mod report;

pub use contingencies::{ContingencyChecker, ContingencyReport, ContingencyRunSummary, Validity};
pub use matchers::{
    check_file_with, EvidenceMatcher, FinalStateMatcher, ModelDeclarationMatcher,
    ParameterMatcher, TimelineMatcher,
};
pub use orchestrator::{run_comparison, CompareConfig, ComparisonSummary, ScenarioReport};
pub use outcome::{CheckKind, CheckOutcome};
pub use refresh::refresh_references;
pub use report::{write_report, VerificationReport};
