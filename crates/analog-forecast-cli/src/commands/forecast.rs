//! One-shot forecast against catalogs on disk.
//!
//! # Usage
//!
//! ```bash
//! analog-forecast forecast --horizon 24h --query query.json \
//!     --variables temperature_2m,precipitation --config forecast.toml
//! ```
//!
//! `query.json` holds a JSON array of `catalog.dimension` numbers. It is
//! normalized to unit length before searching.

use std::path::PathBuf;

use analog_forecast_core::{ForecastOrchestrator, ForecastRequest, ForecastResponse};
use anyhow::Context;
use clap::Args;
use tracing::{error, info};

use super::{load_config, print_json};

/// Arguments for the forecast command.
#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Forecast horizon (6h, 12h, 24h, 48h)
    #[arg(long)]
    pub horizon: String,

    /// JSON file with the query vector
    #[arg(long)]
    pub query: PathBuf,

    /// Comma-separated variable names
    #[arg(long, value_delimiter = ',', required = true)]
    pub variables: Vec<String>,

    /// TOML config file (defaults to config/default.toml plus environment)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Catalog root, overriding the config
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Pretty-print the response
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the forecast command.
///
/// # Returns
///
/// Exit code:
/// - 0: response printed (possibly with unavailable variables)
/// - 1: invalid input, unreadable config or query, or an unavailable horizon
pub async fn handle_forecast(args: ForecastArgs) -> i32 {
    let pretty = args.pretty;
    match run(args).await {
        Ok(response) => match print_json(&response, pretty) {
            Ok(()) => 0,
            Err(e) => {
                error!("failed to print response: {:#}", e);
                1
            }
        },
        Err(e) => {
            error!("forecast failed: {:#}", e);
            1
        }
    }
}

async fn run(args: ForecastArgs) -> anyhow::Result<ForecastResponse> {
    let config = load_config(args.config.as_deref(), args.root.as_ref())?;
    let raw = std::fs::read_to_string(&args.query)
        .with_context(|| format!("reading query from {}", args.query.display()))?;
    let query: Vec<f32> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing query in {}", args.query.display()))?;

    let orchestrator = ForecastOrchestrator::new(config)?;
    let request = ForecastRequest {
        horizon: args.horizon,
        query,
        variables: args.variables,
    };
    let response = orchestrator.forecast(&request).await?;
    info!(
        horizon = %response.horizon,
        available = response.available_count(),
        analogs = response.analogs_used,
        "forecast done"
    );
    Ok(response)
}
