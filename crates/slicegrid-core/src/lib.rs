//! slicegrid core — shared types for zone-aware endpoint slicing.
//!
//! - **`types`** — regions, zones, and the slice groups a strategy produces
//! - **`scenario`** — TOML scenario files that describe input regions
//! - **`config`** — `slicegrid.toml` evaluation and strategy settings

pub mod config;
pub mod scenario;
pub mod types;

pub use config::{EvalConfig, ReportConfig, StrategyConfig};
pub use scenario::{Scenario, ScenarioError, ScenarioFile, ZoneSpec};
pub use types::*;
