//! Scenario files: named input regions described in TOML.
//!
//! ```toml
//! [[scenario]]
//! name = "skewed"
//! zones.a = { endpoints = 10, nodes = 5 }
//! zones.b = { endpoints = 0, nodes = 3 }
//! zones.c = { endpoints = 0, nodes = 2 }
//! ```
//!
//! Node counts are converted to node ratios when a scenario is turned into
//! a [`Region`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::types::{Region, ZoneInfo};

/// Errors loading or converting scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scenario {0} has no zones")]
    NoZones(String),

    #[error("scenario {0} has no nodes in any zone")]
    NoNodes(String),

    #[error("scenario {0} has more endpoints than a region can hold")]
    TooManyEndpoints(String),
}

/// A file holding one or more `[[scenario]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(rename = "scenario", default)]
    pub scenarios: Vec<Scenario>,
}

/// One input scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub zones: BTreeMap<String, ZoneSpec>,
}

/// Raw per-zone counts as written in a scenario file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub endpoints: u32,
    /// Client-originating nodes in this zone.
    pub nodes: u32,
}

impl ScenarioFile {
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(content)?)
    }
}

impl Scenario {
    /// Convert node counts to ratios and build the region.
    pub fn to_region(&self) -> Result<Region, ScenarioError> {
        if self.zones.is_empty() {
            return Err(ScenarioError::NoZones(self.name.clone()));
        }
        let total_nodes: u64 = self.zones.values().map(|z| u64::from(z.nodes)).sum();
        if total_nodes == 0 {
            return Err(ScenarioError::NoNodes(self.name.clone()));
        }

        let zones = self
            .zones
            .iter()
            .map(|(name, spec)| {
                let info = ZoneInfo {
                    endpoints: spec.endpoints,
                    nodes_ratio: f64::from(spec.nodes) / total_nodes as f64,
                };
                (name.clone(), info)
            })
            .collect();
        Region::new(zones).ok_or_else(|| ScenarioError::TooManyEndpoints(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[scenario]]
name = "skewed"
zones.a = { endpoints = 10, nodes = 5 }
zones.b = { endpoints = 0, nodes = 3 }
zones.c = { endpoints = 0, nodes = 2 }

[[scenario]]
name = "even"
zones.a = { endpoints = 1, nodes = 1 }
zones.b = { endpoints = 1, nodes = 1 }
"#;

    #[test]
    fn parses_multiple_scenarios() {
        let file = ScenarioFile::parse(SAMPLE).unwrap();
        assert_eq!(file.scenarios.len(), 2);
        assert_eq!(file.scenarios[0].name, "skewed");
        assert_eq!(file.scenarios[0].zones["a"].endpoints, 10);
        assert_eq!(file.scenarios[1].zones.len(), 2);
    }

    #[test]
    fn empty_file_has_no_scenarios() {
        let file = ScenarioFile::parse("").unwrap();
        assert!(file.scenarios.is_empty());
    }

    #[test]
    fn to_region_derives_ratios_and_total() {
        let file = ScenarioFile::parse(SAMPLE).unwrap();
        let region = file.scenarios[0].to_region().unwrap();
        let zones = region.zones.as_ref().unwrap();

        assert_eq!(region.total_endpoints, 10);
        assert!((zones["a"].nodes_ratio - 0.5).abs() < 1e-12);
        assert!((zones["b"].nodes_ratio - 0.3).abs() < 1e-12);
        assert!((zones["c"].nodes_ratio - 0.2).abs() < 1e-12);
    }

    #[test]
    fn rejects_scenario_without_zones() {
        let scenario = Scenario {
            name: "empty".to_string(),
            zones: BTreeMap::new(),
        };
        assert!(matches!(scenario.to_region(), Err(ScenarioError::NoZones(_))));
    }

    #[test]
    fn rejects_scenario_without_nodes() {
        let scenario = Scenario {
            name: "idle".to_string(),
            zones: BTreeMap::from([(
                "a".to_string(),
                ZoneSpec {
                    endpoints: 3,
                    nodes: 0,
                },
            )]),
        };
        assert!(matches!(scenario.to_region(), Err(ScenarioError::NoNodes(_))));
    }

    #[test]
    fn rejects_scenario_with_overflowing_endpoints() {
        let scenario = Scenario {
            name: "huge".to_string(),
            zones: BTreeMap::from([
                (
                    "a".to_string(),
                    ZoneSpec {
                        endpoints: u32::MAX,
                        nodes: 1,
                    },
                ),
                (
                    "b".to_string(),
                    ZoneSpec {
                        endpoints: 2,
                        nodes: 1,
                    },
                ),
            ]),
        };
        assert!(matches!(
            scenario.to_region(),
            Err(ScenarioError::TooManyEndpoints(name)) if name == "huge"
        ));
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[[scenario]]\nname = 3\n").unwrap();

        let err = ScenarioFile::from_file(&path).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScenarioFile::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }

    #[test]
    fn fixture_scenarios_are_usable() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/scenarios.toml");
        let file = ScenarioFile::from_file(&path).unwrap();

        assert_eq!(file.scenarios.len(), 5);
        for scenario in &file.scenarios {
            let region = scenario.to_region().unwrap();
            let ratios: f64 = region.zones.as_ref().unwrap().values().map(|z| z.nodes_ratio).sum();
            assert!((ratios - 1.0).abs() < 1e-9, "{}", scenario.name);
        }
    }
}
