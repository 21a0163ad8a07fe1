//! Tests for configuration validation.

use crate::config::ForecastConfig;
use crate::types::{Horizon, Variable};

fn assert_rejected(config: ForecastConfig, field: &str) {
    let result = config.validate();
    assert!(result.is_err(), "{} must fail validation", field);
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains(field), "error '{}' must mention {}", msg, field);
}

#[test]
fn test_zero_dimension_rejected() {
    let mut config = ForecastConfig::default_config();
    config.catalog.dimension = 0;
    assert_rejected(config, "catalog.dimension");
}

#[test]
fn test_duplicate_variables_rejected() {
    let mut config = ForecastConfig::default_config();
    config.catalog.variables = vec![Variable::Precipitation, Variable::Precipitation];
    assert_rejected(config, "catalog.variables");
}

#[test]
fn test_empty_horizons_rejected() {
    let mut config = ForecastConfig::default_config();
    config.catalog.horizons.clear();
    assert_rejected(config, "catalog.horizons");
}

#[test]
fn test_duplicate_horizons_rejected() {
    let mut config = ForecastConfig::default_config();
    config.catalog.horizons = vec![Horizon::H6, Horizon::H6];
    assert_rejected(config, "catalog.horizons");
}

#[test]
fn test_zero_k_rejected() {
    let mut config = ForecastConfig::default_config();
    config.search.k = 0;
    assert_rejected(config, "search.k");
}

#[test]
fn test_zero_timeout_rejected() {
    let mut config = ForecastConfig::default_config();
    config.search.timeout_ms = 0;
    assert_rejected(config, "search.timeout_ms");
}

#[test]
fn test_zero_nprobe_rejected() {
    let mut config = ForecastConfig::default_config();
    config.search.nprobe = Some(0);
    assert_rejected(config, "search.nprobe");
}

#[test]
fn test_non_positive_tau_rejected() {
    let mut config = ForecastConfig::default_config();
    config.weighting.tau = 0.0;
    assert_rejected(config, "weighting.tau");

    let mut config = ForecastConfig::default_config();
    config.weighting.tau = f32::NAN;
    assert_rejected(config, "weighting.tau");
}

#[test]
fn test_negative_horizon_alpha_rejected() {
    let mut config = ForecastConfig::default_config();
    config.weighting.horizon_alpha = -0.1;
    assert_rejected(config, "weighting.horizon_alpha");
}

#[test]
fn test_similarity_share_out_of_range_rejected() {
    let mut config = ForecastConfig::default_config();
    config.confidence.similarity_share = 1.5;
    assert_rejected(config, "confidence.similarity_share");
}

#[test]
fn test_zero_max_variables_rejected() {
    let mut config = ForecastConfig::default_config();
    config.limits.max_variables = 0;
    assert_rejected(config, "limits.max_variables");
}
