//! pbx-recordings CLI entry point

use std::process::ExitCode;

use clap::Parser;

use pbx_recordings::cli::{
    app::{cli_config, load_merged_config, resolve_options, run_export, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging::{init_logging, LogOptions},
    presenter::Presenter,
};
use pbx_recordings::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();
    let presenter = Presenter::new();

    // Flushes the log file on drop
    let _log_guard = match init_logging(&LogOptions {
        verbosity: cli.verbose,
        log_file: cli.log_file.clone(),
    }) {
        Ok(guard) => guard,
        Err(e) => {
            presenter.error(&format!("Failed to set up logging: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command.take() {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Merge config
    let config = load_merged_config(cli_config(&cli)).await;

    let options = match resolve_options(&cli, &config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    run_export(options).await
}
