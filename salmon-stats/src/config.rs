//! Display configuration shared by every report.
use serde::{Deserialize, Serialize};

use crate::constants::{COMPACT_DATE_PATTERN, DEFAULT_PERCENTAGE_DIGITS, FULL_DATE_PATTERN};

const DEFAULT_CONFIG_DATA: &str = include_str!("../assets/config.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    pub asset_base_url: String,
    #[serde(default = "StatsConfig::default_percentage_digits")]
    pub percentage_digits: usize,
    #[serde(default = "StatsConfig::default_metric_digits")]
    pub metric_digits: usize,
    #[serde(default = "StatsConfig::default_full_date_pattern")]
    pub full_date_pattern: String,
    #[serde(default = "StatsConfig::default_compact_date_pattern")]
    pub compact_date_pattern: String,
}

impl StatsConfig {
    const fn default_percentage_digits() -> usize {
        DEFAULT_PERCENTAGE_DIGITS
    }

    const fn default_metric_digits() -> usize {
        1
    }

    fn default_full_date_pattern() -> String {
        FULL_DATE_PATTERN.to_string()
    }

    fn default_compact_date_pattern() -> String {
        COMPACT_DATE_PATTERN.to_string()
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self::from_json(DEFAULT_CONFIG_DATA).unwrap_or_else(|_| StatsConfig {
            asset_base_url: "https://splatoon-stats-api.yuki.games/static/images".to_string(),
            percentage_digits: Self::default_percentage_digits(),
            metric_digits: Self::default_metric_digits(),
            full_date_pattern: Self::default_full_date_pattern(),
            compact_date_pattern: Self::default_compact_date_pattern(),
        })
    }
}
