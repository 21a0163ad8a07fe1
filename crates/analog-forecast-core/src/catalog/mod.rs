//! Per-horizon catalogs: artifacts, validation, loading and caching.
//!
//! A catalog is the immutable triple (embeddings[N, D], outcomes[N, V],
//! index) plus the ordered variable list bound to the outcome columns.
//!
//! - **types**: [`Matrix`], [`CatalogParts`], [`Catalog`]
//! - **manifest**: `manifest.json` schema
//! - **persistence**: reading and writing artifact directories
//! - **validation**: structural checks and the read-only integrity hook
//! - **loader**: [`CatalogLoader`] seam and the directory implementation
//! - **registry**: load-once state machine and atomic hot-swap

mod loader;
mod manifest;
pub mod persistence;
mod registry;
mod types;
pub mod validation;

#[cfg(test)]
mod tests;

pub use loader::{CatalogLoader, DirectoryLoader};
pub use manifest::{CatalogManifest, CATALOG_FORMAT_VERSION};
pub use registry::{CatalogRegistry, HorizonState};
pub use types::{Catalog, CatalogExpectations, CatalogParts, Matrix};
pub use validation::{
    inspect, verify_catalog_dir, CheckStatus, IntegrityCheck, IntegrityReport,
};
