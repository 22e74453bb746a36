use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use slicegrid_balance::{SliceAlgorithm, algorithm_by_name};
use slicegrid_core::{Scenario, ScenarioFile, SliceGroups};
use tracing::warn;

pub fn balance(input: &Path, algorithm: &str, format: &str) -> anyhow::Result<()> {
    let file = ScenarioFile::from_file(input)
        .with_context(|| format!("Failed to load scenarios from {}", input.display()))?;
    let algorithm = algorithm_by_name(algorithm);

    let results: Vec<(&Scenario, Result<SliceGroups, String>)> = file
        .scenarios
        .iter()
        .map(|scenario| (scenario, run(scenario, algorithm.as_ref())))
        .collect();

    match format {
        "json" => {
            let doc: Vec<serde_json::Value> = results
                .iter()
                .map(|(scenario, result)| match result {
                    Ok(groups) => serde_json::json!({
                        "name": scenario.name,
                        "algorithm": algorithm.name(),
                        "groups": groups,
                    }),
                    Err(err) => serde_json::json!({
                        "name": scenario.name,
                        "algorithm": algorithm.name(),
                        "error": err,
                    }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        _ => {
            for (scenario, result) in &results {
                print!("{}", format_scenario(&scenario.name, algorithm.name(), result));
            }
        }
    }

    Ok(())
}

fn run(scenario: &Scenario, algorithm: &dyn SliceAlgorithm) -> Result<SliceGroups, String> {
    let region = scenario.to_region().map_err(|e| e.to_string())?;
    algorithm.create_slice_groups(&region).map_err(|e| {
        warn!(scenario = %scenario.name, error = %e, "balancing failed");
        e.to_string()
    })
}

fn format_scenario(name: &str, algorithm: &str, result: &Result<SliceGroups, String>) -> String {
    let mut out = format!("{name} ({algorithm})\n");
    match result {
        Ok(groups) => {
            for (label, group) in groups {
                let traffic = group
                    .zone_traffic_weights
                    .iter()
                    .map(|(zone, weight)| format!("{zone}={weight:.2}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let endpoints = group
                    .composition
                    .iter()
                    .map(|(zone, w)| format!("{zone}={}", w.number))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    out,
                    "  {label:<20} size {:>4}  traffic [{traffic}]  endpoints [{endpoints}]",
                    group.size()
                );
            }
        }
        Err(err) => {
            let _ = writeln!(out, "  invalid: {err}");
        }
    }
    out
}
