//! Outcome variable vocabulary.
//!
//! Variable identity is carried explicitly next to every outcome matrix
//! instead of being implied by column position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// One of the nine verified outcome variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    #[serde(rename = "temperature_2m")]
    Temperature2m,
    #[serde(rename = "dewpoint_2m")]
    Dewpoint2m,
    #[serde(rename = "relative_humidity_2m")]
    RelativeHumidity2m,
    #[serde(rename = "surface_pressure")]
    SurfacePressure,
    #[serde(rename = "wind_speed_10m")]
    WindSpeed10m,
    #[serde(rename = "wind_direction_10m")]
    WindDirection10m,
    #[serde(rename = "wind_gust_10m")]
    WindGust10m,
    #[serde(rename = "precipitation")]
    Precipitation,
    #[serde(rename = "cloud_cover")]
    CloudCover,
}

impl Variable {
    /// Canonical column order of a full outcome matrix.
    pub const ALL: [Variable; 9] = [
        Variable::Temperature2m,
        Variable::Dewpoint2m,
        Variable::RelativeHumidity2m,
        Variable::SurfacePressure,
        Variable::WindSpeed10m,
        Variable::WindDirection10m,
        Variable::WindGust10m,
        Variable::Precipitation,
        Variable::CloudCover,
    ];

    /// Wire name, e.g. `"wind_speed_10m"`.
    pub fn name(self) -> &'static str {
        match self {
            Variable::Temperature2m => "temperature_2m",
            Variable::Dewpoint2m => "dewpoint_2m",
            Variable::RelativeHumidity2m => "relative_humidity_2m",
            Variable::SurfacePressure => "surface_pressure",
            Variable::WindSpeed10m => "wind_speed_10m",
            Variable::WindDirection10m => "wind_direction_10m",
            Variable::WindGust10m => "wind_gust_10m",
            Variable::Precipitation => "precipitation",
            Variable::CloudCover => "cloud_cover",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Variable::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ForecastError::InvalidRequest(format!("unknown variable '{}'", s)))
    }
}
