//! Read-only integrity check of catalog artifacts.
//!
//! Runs every structural check the engine applies at load time and reports
//! all of them, so one run shows every defect. Nothing is registered or
//! served.

use std::path::PathBuf;

use analog_forecast_core::catalog::persistence::horizon_dir;
use analog_forecast_core::{verify_catalog_dir, CatalogExpectations, Horizon, IntegrityReport};
use clap::Args;
use serde::Serialize;
use tracing::{error, warn};

use super::{load_config, print_json};

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Catalog root, overriding the config
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Check only this horizon (default: every configured horizon)
    #[arg(long)]
    pub horizon: Option<String>,

    /// TOML config file supplying the expected dimension and variables
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Outcome for one horizon.
#[derive(Debug, Serialize)]
pub struct HorizonCheck {
    pub horizon: Horizon,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<IntegrityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the check command.
///
/// # Returns
///
/// Exit code:
/// - 0: every checked horizon is healthy
/// - 1: a check failed, artifacts are unreadable, or arguments are invalid
pub fn handle_check(args: CheckArgs) -> i32 {
    let results = match check(&args) {
        Ok(results) => results,
        Err(e) => {
            error!("check failed: {:#}", e);
            return 1;
        }
    };
    if let Err(e) = print_json(&results, true) {
        error!("failed to print reports: {:#}", e);
        return 1;
    }
    if results.iter().all(|r| r.healthy) {
        0
    } else {
        1
    }
}

fn check(args: &CheckArgs) -> anyhow::Result<Vec<HorizonCheck>> {
    let config = load_config(args.config.as_deref(), args.root.as_ref())?;
    let horizons = match &args.horizon {
        Some(h) => vec![h.parse::<Horizon>()?],
        None => config.catalog.horizons.clone(),
    };
    let expectations = CatalogExpectations {
        dimension: config.catalog.dimension,
        variables: config.catalog.variables.clone(),
    };

    Ok(horizons
        .into_iter()
        .map(|horizon| {
            let dir = horizon_dir(&config.catalog.root, horizon);
            match verify_catalog_dir(&dir, horizon, &expectations) {
                Ok(report) => {
                    for c in report.failures() {
                        warn!(
                            horizon = %horizon,
                            check = %c.name,
                            expected = %c.expected,
                            found = %c.found,
                            "integrity check failed"
                        );
                    }
                    HorizonCheck {
                        horizon,
                        healthy: report.is_healthy(),
                        report: Some(report),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(horizon = %horizon, error = %e, "artifacts unreadable");
                    HorizonCheck {
                        horizon,
                        healthy: false,
                        report: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect())
}
