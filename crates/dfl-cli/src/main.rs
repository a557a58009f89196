use clap::Parser;
use dfl_cli::{error_exit_code, exit_code, Cli, Commands};
use std::process;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let status = match &cli.command {
        Some(Commands::Contingencies {
            root,
            test,
            input_model,
            registry,
            event_time,
            run,
        }) => {
            info!("Checking contingencies of {} under {}", test, root.display());
            match commands::contingencies::handle(
                root,
                test,
                input_model,
                registry.as_ref(),
                event_time.as_deref(),
                run,
            ) {
                Ok(differences) => exit_code(differences),
                Err(e) => {
                    error!("Contingency check aborted: {:#}", e);
                    error_exit_code(&e)
                }
            }
        }
        Some(Commands::Diff {
            root,
            testdir,
            install_prefix,
            reference_prefix,
            threads,
            run,
        }) => {
            info!("Comparing {} with reference under {}", testdir, root.display());
            match commands::diff::handle(
                root,
                testdir,
                install_prefix.as_deref(),
                reference_prefix.as_deref(),
                *threads,
                run,
            ) {
                Ok(differences) => exit_code(differences),
                Err(e) => {
                    error!("Comparison aborted: {:#}", e);
                    error_exit_code(&e)
                }
            }
        }
        Some(Commands::UpdateReference {
            root,
            testdir,
            settings,
        }) => match commands::update_reference::handle(root, testdir, settings.as_deref()) {
            Ok(()) => 0,
            Err(e) => {
                error!("Reference update failed: {:#}", e);
                error_exit_code(&e)
            }
        },
        Some(Commands::Completions { shell, out }) => {
            match commands::completions::handle(*shell, out.as_deref()) {
                Ok(()) => {
                    info!("Completions generated");
                    0
                }
                Err(e) => {
                    error!("Completions generation failed: {:?}", e);
                    error_exit_code(&e)
                }
            }
        }
        None => {
            info!("No command given; see --help");
            0
        }
    };
    process::exit(status);
}
