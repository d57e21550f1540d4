//! meetminutes CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use meetminutes_cli::cli::{Cli, Command, ConfigAction};
use meetminutes_cli::config::AppConfig;
use meetminutes_cli::error::{CliError, CliResult};
use meetminutes_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.log_json {
        TracingConfig::cron()
    } else {
        TracingConfig::cli(cli.debug)
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path).map_err(CliError::Config)?,
        None => AppConfig::load().map_err(CliError::Config)?,
    };

    match cli.command {
        Command::Archive {
            meeting,
            date,
            email,
        } => {
            meetminutes_cli::commands::archive::run(
                &config,
                meeting.as_deref(),
                date,
                email.as_deref(),
            )
            .await
        }
        Command::Auth { force } => meetminutes_cli::commands::auth::run(&config, force).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => meetminutes_cli::commands::config::dump(&config),
            ConfigAction::Validate => meetminutes_cli::commands::config::validate(&config),
            ConfigAction::Path => meetminutes_cli::commands::config::path(),
        },
    }
}
