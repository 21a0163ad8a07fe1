//! CLI command handlers
//!
//! # Modules
//!
//! - `forecast`: one-shot forecast from a query file
//! - `check`: read-only integrity reports
//! - `inspect`: manifest dump
//!
//! Handlers return the process exit code: 0 on success, 1 on failure.

pub mod check;
pub mod forecast;
pub mod inspect;

use std::path::{Path, PathBuf};

use analog_forecast_core::ForecastConfig;
use anyhow::Context;

/// Config from `path`, or the layered defaults when none is given.
///
/// `root` overrides `catalog.root` either way.
pub fn load_config(path: Option<&Path>, root: Option<&PathBuf>) -> anyhow::Result<ForecastConfig> {
    let mut config = match path {
        Some(p) => ForecastConfig::from_file(p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => ForecastConfig::load().context("loading layered config")?,
    };
    if let Some(root) = root {
        config.catalog.root = root.clone();
    }
    Ok(config)
}

/// Print `value` as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
