//! # dfl-io: reading simulator artifacts
//!
//! Everything that touches the file system on behalf of the verifier:
//!
//! - [`registry`]: contingency registry JSON
//! - [`config`]: build mode, simulation kind, chosen outputs
//! - [`layout`]: results/reference path conventions
//! - [`xml`]: flat element view over `.dyd`, `.par`, IIDM and constraints files
//! - [`timeline`]: XML and legacy text timelines behind one [`TimelineSource`]
//! - [`text`]: install-prefix normalization, line comparison, directory listing
//! - [`compare`]: tolerant final-state and constraints comparators
//!
//! ## Error Handling
//!
//! Parsers return [`dfl_core::DflResult`]; a [`dfl_core::DflError::Parse`] from
//! one artifact is meant to fail the check that read it and nothing more.
//! Registry and configuration errors are fatal.

pub mod compare;
pub mod config;
pub mod layout;
pub mod registry;
pub mod text;
pub mod timeline;
pub mod xml;

pub use compare::{
    ConstraintsComparator, FileDiff, FinalStateComparator, Tolerance, ToleranceComparator,
};
pub use config::{
    load_run_configuration, BuildMode, OutputClass, RunConfiguration, SimulationKind,
};
pub use layout::{ContingencyArtifacts, TestLayout};
pub use registry::{default_registry_path, load_registry};
pub use text::{compare_lines, LineComparison, PathNormalizer};
pub use timeline::{TimelineEvent, TimelineSource, DEFAULT_EVENT_TIME};
