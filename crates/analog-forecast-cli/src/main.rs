//! Analog Forecast CLI
//!
//! Operator tooling for the analog-ensemble forecasting engine.
//!
//! # Commands
//!
//! - `forecast`: run one forecast against catalogs on disk, print JSON
//! - `check`: structural integrity report per horizon, exit 1 on mismatch
//! - `inspect`: print a horizon's catalog manifest
//!
//! Logs go to stderr; command output goes to stdout. Without `-v` the log
//! filter comes from `RUST_LOG`, then `[logging]` in the command's config,
//! then `warn`.

use std::path::Path;

use analog_forecast_core::config::LoggingConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Analog Forecast CLI - catalog checks and ad-hoc forecasts
#[derive(Parser)]
#[command(name = "analog-forecast")]
#[command(version)]
#[command(about = "Operator tooling for the analog-ensemble forecasting engine")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the requested variables for one query vector
    Forecast(commands::forecast::ForecastArgs),
    /// Verify catalog artifacts without serving them
    ///
    /// Prints one JSON report per horizon. Exits with 1 if any horizon has
    /// a failing check or unreadable artifacts.
    Check(commands::check::CheckArgs),
    /// Print a horizon's catalog manifest
    Inspect(commands::inspect::InspectArgs),
}

impl Commands {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Forecast(args) => args.config.as_deref(),
            Commands::Check(args) => args.config.as_deref(),
            Commands::Inspect(_) => None,
        }
    }
}

/// Level used when neither `-v` nor `RUST_LOG` is given.
fn configured_level(logging: Option<&LoggingConfig>) -> LevelFilter {
    logging
        .and_then(|l| l.level.parse().ok())
        .unwrap_or(LevelFilter::WARN)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config errors surface again, with context, inside the command.
    let logging = commands::load_config(cli.command.config_path(), None)
        .ok()
        .map(|c| c.logging);

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::default().add_directive(configured_level(logging.as_ref()).into())
        }),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    match logging.as_ref().map(|l| l.format.as_str()) {
        Some("compact") => subscriber.compact().init(),
        _ => subscriber.init(),
    }

    let exit_code = match cli.command {
        Commands::Forecast(args) => commands::forecast::handle_forecast(args).await,
        Commands::Check(args) => commands::check::handle_check(args),
        Commands::Inspect(args) => commands::inspect::handle_inspect(args),
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_configured_level_follows_logging_section() {
        assert_eq!(configured_level(Some(&logging("debug"))), LevelFilter::DEBUG);
        assert_eq!(configured_level(Some(&logging("ERROR"))), LevelFilter::ERROR);
        assert_eq!(configured_level(Some(&logging("off"))), LevelFilter::OFF);
    }

    #[test]
    fn test_configured_level_defaults_to_warn() {
        assert_eq!(configured_level(None), LevelFilter::WARN);
        assert_eq!(configured_level(Some(&logging("loud"))), LevelFilter::WARN);
    }

    #[test]
    fn test_config_path_per_command() {
        let cli = Cli::parse_from(["analog-forecast", "check", "--config", "ops.toml"]);
        assert_eq!(cli.command.config_path(), Some(Path::new("ops.toml")));
        let cli = Cli::parse_from([
            "analog-forecast",
            "inspect",
            "--root",
            "catalogs",
            "--horizon",
            "24h",
        ]);
        assert_eq!(cli.command.config_path(), None);
    }
}
