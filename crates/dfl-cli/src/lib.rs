pub mod cli;
pub mod settings;

use dfl_core::DflError;

pub use cli::{build_cli_command, Cli, Commands, RunArgs};
pub use settings::{load_settings, Settings};

/// Process status for a disagreement count: 0 when clean, otherwise the
/// count clamped to 255 so it cannot wrap to zero.
pub fn exit_code(differences: usize) -> i32 {
    differences.min(255) as i32
}

/// Status of an invocation aborted by a configuration or registry error.
pub const FATAL_EXIT_CODE: i32 = 2;

/// Status of a command that returned `err`. Configuration and registry
/// errors anywhere in the chain are fatal; any other error stopped one
/// operation and counts as a single failure.
pub fn error_exit_code(err: &anyhow::Error) -> i32 {
    let fatal = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<DflError>())
        .any(DflError::is_fatal);
    if fatal {
        FATAL_EXIT_CODE
    } else {
        exit_code(1)
    }
}
