// Entrypoint for the CLI application.
// - Loads the optional env file first so every later step sees its values.
// - Builds the configuration and API client, then hands off to `ui::run`.
// - Any failure is printed once and turned into exit status 1.

use anyhow::Context;
use clap::Parser;
use nftitem_upload::cli::Cli;
use nftitem_upload::config::{load_env_file, Config};
use nftitem_upload::{logging, ui, ApiClient};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Usage errors exit 1 like every other failure; --help and --version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.env {
        load_env_file(path)?;
    }
    logging::init_logging(cli.verbose)?;

    let action = cli.action()?;
    let config = Config::from_env();
    tracing::debug!(?config, ?action, signer_configured = config.has_signer(), "starting");

    let api = ApiClient::new(config).context("Failed to build HTTP client")?;
    ui::run(&api, action, cli.upload_request()).await?;
    Ok(())
}
