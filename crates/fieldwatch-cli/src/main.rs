//! Fieldwatch CLI
//!
//! Command-line interface for the Fieldwatch outbreak map.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use fieldwatch_cli::config::DEFAULT_LOG_FILTER;
use fieldwatch_cli::{Cli, Command, FieldwatchConfig, commands, config_handlers};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<fieldwatch_cli::Error>()
                .map_or(1, fieldwatch_cli::Error::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Config { action } => {
            init_tracing(cli.verbose, DEFAULT_LOG_FILTER);
            config_handlers::handle_config_command(config_path, action)?;
        }
        Command::Serve { host, port } => {
            let config = setup(config_path, cli.verbose)?;
            commands::serve(config, host, port).await?;
        }
        Command::Watch { json } => {
            let config = setup(config_path, cli.verbose)?;
            commands::watch(config, json).await?;
        }
        Command::Report(args) => {
            let config = setup(config_path, cli.verbose)?;
            commands::report(config, args).await?;
        }
        Command::Clusters { json, details } => {
            let config = setup(config_path, cli.verbose)?;
            commands::clusters(config, json, details).await?;
        }
        Command::Clear { yes } => {
            let config = setup(config_path, cli.verbose)?;
            commands::clear(config, yes).await?;
        }
    }
    Ok(())
}

/// Loads the configuration and initializes tracing from it.
fn setup(config_path: Option<&str>, verbose: u8) -> fieldwatch_cli::Result<FieldwatchConfig> {
    let config = FieldwatchConfig::load(config_path)?;
    init_tracing(verbose, &config.log.level);
    Ok(config)
}

/// `RUST_LOG` wins over the configured filter; `-v` flags win over both.
fn init_tracing(verbose: u8, default_filter: &str) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        1 => EnvFilter::new("info,fieldwatch=debug"),
        _ => EnvFilter::new("debug,fieldwatch=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
