//! slicegrid.toml configuration parser.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock scoring weights and the `LocalShared` strategy.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub report: ReportConfig,
    pub strategy: StrategyConfig,
}

/// Weights and constants used to turn evaluation metrics into scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Capacity of a single EndpointSlice.
    pub endpoints_per_slice: u32,
    pub in_zone_traffic_weight: f64,
    pub deviation_weight: f64,
    pub slice_weight: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoints_per_slice: 100,
            in_zone_traffic_weight: 0.4,
            deviation_weight: 0.4,
            slice_weight: 0.2,
        }
    }
}

/// Which strategy to run, with optional overrides for the global strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub algorithm: String,
    pub global_weight: Option<f64>,
    pub global_threshold: Option<u32>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            algorithm: "LocalShared".to_string(),
            global_weight: None,
            global_threshold: None,
        }
    }
}

impl EvalConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EvalConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
