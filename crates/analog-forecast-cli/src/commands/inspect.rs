//! Manifest dump for one horizon.

use std::path::PathBuf;

use analog_forecast_core::catalog::persistence::{horizon_dir, read_manifest};
use analog_forecast_core::{CatalogManifest, Horizon};
use clap::Args;
use tracing::error;

use super::print_json;

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Catalog root holding one directory per horizon
    #[arg(long)]
    pub root: PathBuf,

    /// Horizon to inspect (6h, 12h, 24h, 48h)
    #[arg(long)]
    pub horizon: String,
}

pub fn handle_inspect(args: InspectArgs) -> i32 {
    match inspect(&args).and_then(|m| print_json(&m, true)) {
        Ok(()) => 0,
        Err(e) => {
            error!("inspect failed: {:#}", e);
            1
        }
    }
}

fn inspect(args: &InspectArgs) -> anyhow::Result<CatalogManifest> {
    let horizon: Horizon = args.horizon.parse()?;
    Ok(read_manifest(&horizon_dir(&args.root, horizon))?)
}
