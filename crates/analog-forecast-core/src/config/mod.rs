//! Configuration management for the forecasting engine.

mod sub_configs;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

pub use sub_configs::{
    CatalogConfig, ConfidenceConfig, LimitsConfig, LoggingConfig, SearchConfig, WeightingConfig,
    WeightingKind,
};

/// Environment variable selecting the environment-specific config file.
pub const ENV_SELECTOR: &str = "ANALOG_FORECAST_ENV";

/// Prefix of environment overrides, e.g. `ANALOG_FORECAST__SEARCH__K=64`.
pub const ENV_PREFIX: &str = "ANALOG_FORECAST";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ForecastConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub weighting: WeightingConfig,
    pub confidence: ConfidenceConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

impl ForecastConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{ANALOG_FORECAST_ENV}.toml (environment-specific)
    /// 3. Environment variables with ANALOG_FORECAST__ prefix
    pub fn load() -> ForecastResult<Self> {
        let env = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        let config: ForecastConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults for testing and development.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ForecastResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::InvalidConfig(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: ForecastConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> ForecastResult<()> {
        if self.catalog.dimension == 0 {
            return Err(ForecastError::InvalidConfig(
                "catalog.dimension must be greater than 0".into(),
            ));
        }
        if self.catalog.variables.is_empty() {
            return Err(ForecastError::InvalidConfig(
                "catalog.variables must not be empty".into(),
            ));
        }
        let distinct: HashSet<_> = self.catalog.variables.iter().collect();
        if distinct.len() != self.catalog.variables.len() {
            return Err(ForecastError::InvalidConfig(
                "catalog.variables contains duplicates".into(),
            ));
        }
        if self.catalog.horizons.is_empty() {
            return Err(ForecastError::InvalidConfig(
                "catalog.horizons must not be empty".into(),
            ));
        }
        let distinct: HashSet<_> = self.catalog.horizons.iter().collect();
        if distinct.len() != self.catalog.horizons.len() {
            return Err(ForecastError::InvalidConfig(
                "catalog.horizons contains duplicates".into(),
            ));
        }

        if self.search.k == 0 {
            return Err(ForecastError::InvalidConfig(
                "search.k must be greater than 0".into(),
            ));
        }
        if self.search.timeout_ms == 0 {
            return Err(ForecastError::InvalidConfig(
                "search.timeout_ms must be greater than 0".into(),
            ));
        }
        if self.search.nprobe == Some(0) {
            return Err(ForecastError::InvalidConfig(
                "search.nprobe must be greater than 0 when set".into(),
            ));
        }

        require_positive("weighting.tau", self.weighting.tau)?;
        require_positive("weighting.power", self.weighting.power)?;
        require_positive("weighting.epsilon", self.weighting.epsilon)?;
        require_non_negative("weighting.horizon_alpha", self.weighting.horizon_alpha)?;

        require_positive("confidence.distance_scale", self.confidence.distance_scale)?;
        require_positive("confidence.ess_half", self.confidence.ess_half)?;
        require_positive(
            "confidence.horizon_scale_hours",
            self.confidence.horizon_scale_hours,
        )?;
        let share = self.confidence.similarity_share;
        if !(0.0..=1.0).contains(&share) {
            return Err(ForecastError::InvalidConfig(format!(
                "confidence.similarity_share must be in [0, 1], got {}",
                share
            )));
        }

        if self.limits.max_variables == 0 {
            return Err(ForecastError::InvalidConfig(
                "limits.max_variables must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

fn require_positive(field: &str, value: f32) -> ForecastResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidConfig(format!(
            "{} must be finite and > 0, got {}",
            field, value
        )))
    }
}

fn require_non_negative(field: &str, value: f32) -> ForecastResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidConfig(format!(
            "{} must be finite and >= 0, got {}",
            field, value
        )))
    }
}
