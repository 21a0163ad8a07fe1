//! Catalog artifact persistence.
//!
//! One directory per horizon:
//!
//! ```text
//! <root>/<horizon>/manifest.json   - CatalogManifest (JSON)
//! <root>/<horizon>/embeddings.bin  - Matrix [N, D] (bincode)
//! <root>/<horizon>/outcomes.bin    - Matrix [N, V] (bincode)
//! <root>/<horizon>/index.bin       - VectorIndex (bincode)
//! ```
//!
//! Reading performs no validation; see [`super::validation`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::manifest::CatalogManifest;
use super::types::CatalogParts;
use crate::error::{ForecastError, ForecastResult};
use crate::types::Horizon;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";
pub const OUTCOMES_FILE: &str = "outcomes.bin";
pub const INDEX_FILE: &str = "index.bin";

/// Directory holding `horizon`'s artifacts under `root`.
pub fn horizon_dir(root: &Path, horizon: Horizon) -> PathBuf {
    root.join(horizon.label())
}

/// Read the manifest alone.
pub fn read_manifest(dir: &Path) -> ForecastResult<CatalogManifest> {
    let path = dir.join(MANIFEST_FILE);
    let file = open(&path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        ForecastError::Deserialization(format!("Failed to parse '{}': {}", path.display(), e))
    })
}

/// Read all four artifacts without validating them.
pub fn read_parts(dir: &Path) -> ForecastResult<CatalogParts> {
    let manifest = read_manifest(dir)?;
    let embeddings = read_bincode(&dir.join(EMBEDDINGS_FILE))?;
    let outcomes = read_bincode(&dir.join(OUTCOMES_FILE))?;
    let index = read_bincode(&dir.join(INDEX_FILE))?;
    debug!(dir = %dir.display(), rows = manifest.rows, "read catalog artifacts");
    Ok(CatalogParts {
        manifest,
        embeddings,
        outcomes,
        index,
    })
}

/// Write all four artifacts into `dir`, creating it if needed.
pub fn write_parts(dir: &Path, parts: &CatalogParts) -> ForecastResult<()> {
    std::fs::create_dir_all(dir)?;

    let manifest_path = dir.join(MANIFEST_FILE);
    let mut writer = BufWriter::new(File::create(&manifest_path)?);
    serde_json::to_writer_pretty(&mut writer, &parts.manifest).map_err(|e| {
        ForecastError::Serialization(format!(
            "Failed to write '{}': {}",
            manifest_path.display(),
            e
        ))
    })?;
    writer.flush()?;

    write_bincode(&dir.join(EMBEDDINGS_FILE), &parts.embeddings)?;
    write_bincode(&dir.join(OUTCOMES_FILE), &parts.outcomes)?;
    write_bincode(&dir.join(INDEX_FILE), &parts.index)?;
    debug!(dir = %dir.display(), rows = parts.manifest.rows, "wrote catalog artifacts");
    Ok(())
}

fn open(path: &Path) -> ForecastResult<File> {
    File::open(path).map_err(|e| {
        ForecastError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {}", path.display(), e),
        ))
    })
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> ForecastResult<T> {
    let file = open(path)?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
        ForecastError::Deserialization(format!("Failed to decode '{}': {}", path.display(), e))
    })
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> ForecastResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|e| {
        ForecastError::Serialization(format!("Failed to encode '{}': {}", path.display(), e))
    })?;
    writer.flush()?;
    Ok(())
}
