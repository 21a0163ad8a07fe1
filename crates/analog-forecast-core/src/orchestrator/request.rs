//! Forecast requests and boundary validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ForecastConfig;
use crate::error::{ForecastError, ForecastResult};
use crate::index::l2_normalize;
use crate::types::{Horizon, Variable};

/// A forecast request as received from a caller.
///
/// Fields are untyped strings so that unknown names are reported as
/// `InvalidRequest` instead of failing deserialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub horizon: String,
    pub query: Vec<f32>,
    pub variables: Vec<String>,
}

impl ForecastRequest {
    pub fn new(horizon: Horizon, query: Vec<f32>, variables: &[Variable]) -> Self {
        Self {
            horizon: horizon.label().to_string(),
            query,
            variables: variables.iter().map(|v| v.name().to_string()).collect(),
        }
    }

    /// Check the request against `config` and normalise the query.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: unknown or disabled horizon, unknown variable,
    ///   no variables, more distinct variables than `limits.max_variables`
    /// - `InvalidQuery`: wrong length, non-finite component, zero norm
    pub fn validate(&self, config: &ForecastConfig) -> ForecastResult<ValidatedRequest> {
        let horizon: Horizon = self.horizon.parse()?;
        if !config.catalog.horizons.contains(&horizon) {
            return Err(ForecastError::InvalidRequest(format!(
                "horizon {} is not enabled",
                horizon
            )));
        }

        if self.variables.is_empty() {
            return Err(ForecastError::InvalidRequest(
                "at least one variable is required".into(),
            ));
        }
        let variables = self
            .variables
            .iter()
            .map(|name| name.parse::<Variable>())
            .collect::<ForecastResult<BTreeSet<_>>>()?;
        let max = config.limits.max_variables;
        if variables.len() > max {
            return Err(ForecastError::InvalidRequest(format!(
                "{} distinct variables requested, at most {} allowed",
                variables.len(),
                max
            )));
        }

        let query = validate_query(&self.query, config.catalog.dimension)?;

        Ok(ValidatedRequest {
            horizon,
            query,
            variables: variables.into_iter().collect(),
        })
    }
}

/// A request that passed validation. The query is unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub horizon: Horizon,
    pub query: Vec<f32>,
    /// Distinct variables in canonical order.
    pub variables: Vec<Variable>,
}

fn validate_query(query: &[f32], dimension: usize) -> ForecastResult<Vec<f32>> {
    if query.len() != dimension {
        return Err(ForecastError::invalid_query(
            "query length differs from embedding dimension",
            dimension,
            query.len(),
        ));
    }
    let non_finite = query.iter().filter(|x| !x.is_finite()).count();
    if non_finite > 0 {
        return Err(ForecastError::invalid_query(
            "query contains non-finite values",
            "0 non-finite values",
            format!("{} non-finite values", non_finite),
        ));
    }

    let mut query = query.to_vec();
    let norm = l2_normalize(&mut query);
    if !(norm > 0.0 && norm.is_finite()) {
        return Err(ForecastError::invalid_query(
            "query norm must be finite and non-zero",
            "norm > 0",
            norm,
        ));
    }
    Ok(query)
}
