//! Core value types shared across the engine.
//!
//! - [`Horizon`]: forecast lead time, selects a catalog
//! - [`Variable`]: the fixed 9-name outcome vocabulary
//! - [`ForecastRecord`] / [`ForecastResponse`]: per-request output

mod horizon;
mod record;
mod variable;

pub use horizon::Horizon;
pub use record::{ForecastRecord, ForecastResponse};
pub use variable::Variable;

/// Default embedding dimension of catalog and query vectors.
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Number of outcome variables in the vocabulary.
pub const VARIABLE_COUNT: usize = 9;
