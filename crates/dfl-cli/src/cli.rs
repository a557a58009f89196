use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

/// Environment variable the launcher's build scripts export.
pub const BUILD_TYPE_ENV: &str = "DYNAFLOW_LAUNCHER_BUILD_TYPE";

const EXIT_STATUS_HELP: &str = "\
Exit status:
  0    every check passed
  N    number of failed checks, capped at 255
  2    also used when a configuration or registry error aborts the run before
       any check; only a finished run prints its summary line on stdout";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Verify launcher outputs",
    long_about = None,
    after_help = EXIT_STATUS_HELP
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by the commands that depend on the build configuration.
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Build type of the launcher (Debug or Release)
    #[arg(long, env = BUILD_TYPE_ENV)]
    pub build_type: String,

    /// Simulation kind: steady-state or security-analysis
    #[arg(long, default_value = "security-analysis")]
    pub kind: String,

    /// Launcher configuration file (JSON) holding the chosen outputs
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Settings file (TOML) with tolerances, prefixes and threads
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub settings: Option<PathBuf>,

    /// Write a JSON report of every check to this path
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,

    /// Print passing checks too
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that every declared contingency left consistent evidence
    Contingencies {
        /// Root directory holding resultsTestsTmp, reference and res
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
        /// Test name
        test: String,
        /// Input model name prefixing the per-contingency .dyd/.par files
        input_model: String,
        /// Contingency registry (default: {root}/res/contingencies_{test}.json)
        #[arg(long, value_hint = ValueHint::FilePath)]
        registry: Option<PathBuf>,
        /// Timestamp of contingency events in legacy text timelines
        #[arg(long)]
        event_time: Option<String>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Compare a test's results tree with its reference tree
    Diff {
        /// Root directory holding resultsTestsTmp and reference
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
        /// Test directory name
        testdir: String,
        /// Installation prefix embedded in the result .dyd/.par files
        #[arg(long)]
        install_prefix: Option<String>,
        /// Installation prefix embedded in the reference files (default: install prefix)
        #[arg(long)]
        reference_prefix: Option<String>,
        /// Worker threads (0 = one per CPU)
        #[arg(long)]
        threads: Option<usize>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Copy result final states that differ from the reference over the reference
    UpdateReference {
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
        testdir: String,
        /// Settings file (TOML) with comparator tolerances
        #[arg(long, value_hint = ValueHint::FilePath)]
        settings: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn help_documents_exit_status() {
        let help = build_cli_command().render_help().to_string();
        assert!(help.contains("Exit status"));
        assert!(help.contains("configuration or registry error"));
    }

    #[test]
    fn diff_arguments_parse() {
        let cli = Cli::try_parse_from([
            "dfl-cli",
            "diff",
            "/tmp/root",
            "case",
            "--build-type",
            "Release",
            "--install-prefix",
            "/opt/dfl",
            "--threads",
            "0",
            "-v",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Diff {
                testdir,
                install_prefix,
                threads,
                run,
                ..
            }) => {
                assert_eq!(testdir, "case");
                assert_eq!(install_prefix.as_deref(), Some("/opt/dfl"));
                assert_eq!(threads, Some(0));
                assert_eq!(run.build_type, "Release");
                assert!(run.verbose);
                assert_eq!(run.kind, "security-analysis");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
