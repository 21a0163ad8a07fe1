//! Forecast horizon enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Forecast lead time. Each horizon has its own catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "48h")]
    H48,
}

impl Horizon {
    /// All horizons, shortest first.
    pub const ALL: [Horizon; 4] = [Horizon::H6, Horizon::H12, Horizon::H24, Horizon::H48];

    /// Lead time in hours.
    #[inline]
    pub fn hours(self) -> u32 {
        match self {
            Horizon::H6 => 6,
            Horizon::H12 => 12,
            Horizon::H24 => 24,
            Horizon::H48 => 48,
        }
    }

    /// Directory and wire label, e.g. `"24h"`.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Horizon::H6 => "6h",
            Horizon::H12 => "12h",
            Horizon::H24 => "24h",
            Horizon::H48 => "48h",
        }
    }

    /// Look up a horizon by its lead time in hours.
    pub fn from_hours(hours: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.hours() == hours)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Horizon {
    type Err = ForecastError;

    /// Accepts `"24h"`, `"24"` or `"H24"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let digits = trimmed
            .strip_suffix('h')
            .or_else(|| trimmed.strip_prefix('h'))
            .unwrap_or(&trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Horizon::from_hours)
            .ok_or_else(|| {
                ForecastError::InvalidRequest(format!(
                    "unknown horizon '{}': expected one of 6h, 12h, 24h, 48h",
                    s
                ))
            })
    }
}
