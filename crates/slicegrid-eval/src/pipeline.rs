//! Evaluation pipeline: many scenario producers, one report consumer.

use std::path::Path;
use std::sync::Arc;

use slicegrid_balance::SliceAlgorithm;
use slicegrid_core::{ReportConfig, Scenario};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{ReportError, ReportResult};
use crate::evaluator::{Evaluation, evaluate};
use crate::report::{RunSummary, write_report};

/// Backlog between producers and the report writer.
const CHANNEL_CAPACITY: usize = 64;

/// One scenario's result, as handed to the report writer.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub evaluation: Evaluation,
}

/// Balance and evaluate a single scenario.
///
/// Unusable scenarios and balancing errors become invalid evaluations.
pub fn evaluate_scenario(
    scenario: &Scenario,
    algorithm: &dyn SliceAlgorithm,
    endpoints_per_slice: u32,
) -> ScenarioOutcome {
    let evaluation = match scenario.to_region() {
        Ok(region) => match algorithm.create_slice_groups(&region) {
            Ok(groups) => evaluate(&region, &groups, endpoints_per_slice),
            Err(err) => {
                warn!(scenario = %scenario.name, error = %err, "balancing failed");
                Evaluation::invalid(region.total_endpoints)
            }
        },
        Err(err) => {
            warn!(scenario = %scenario.name, error = %err, "unusable scenario");
            Evaluation::invalid(0)
        }
    };

    ScenarioOutcome {
        name: scenario.name.clone(),
        evaluation,
    }
}

/// Evaluate every scenario with `algorithm` and write the report.
///
/// Rows appear in completion order. The report is always closed before
/// this returns; a report error is returned in preference to a worker
/// failure.
pub async fn run_pipeline(
    scenarios: Vec<Scenario>,
    algorithm: Arc<dyn SliceAlgorithm>,
    report_path: &Path,
    config: &ReportConfig,
) -> ReportResult<RunSummary> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let path = report_path.to_path_buf();
    let writer_config = config.clone();
    let consumer = tokio::task::spawn_blocking(move || write_report(&path, rx, &writer_config));

    info!(
        scenarios = scenarios.len(),
        algorithm = algorithm.name(),
        "starting evaluation"
    );

    let mut producers = JoinSet::new();
    for scenario in scenarios {
        let tx = tx.clone();
        let algorithm = Arc::clone(&algorithm);
        let endpoints_per_slice = config.endpoints_per_slice;
        producers.spawn_blocking(move || {
            let outcome = evaluate_scenario(&scenario, algorithm.as_ref(), endpoints_per_slice);
            if tx.blocking_send(outcome).is_err() {
                debug!(scenario = %scenario.name, "report closed, dropping outcome");
            }
        });
    }
    // The consumer stops once every producer's sender is gone.
    drop(tx);

    let mut worker_error = None;
    while let Some(joined) = producers.join_next().await {
        if let Err(err) = joined {
            error!(error = %err, "scenario worker failed");
            if worker_error.is_none() {
                worker_error = Some(ReportError::Worker(err.to_string()));
            }
        }
    }

    let summary = consumer
        .await
        .map_err(|err| ReportError::Worker(err.to_string()))??;
    if let Some(err) = worker_error {
        return Err(err);
    }

    info!(
        rows = summary.rows,
        invalid = summary.invalid,
        "evaluation complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicegrid_balance::{LocalSharedAlgorithm, algorithm_by_name};
    use slicegrid_core::ScenarioFile;

    const SCENARIOS: &str = r#"
[[scenario]]
name = "skewed"
zones.a = { endpoints = 10, nodes = 5 }
zones.b = { endpoints = 0, nodes = 3 }
zones.c = { endpoints = 0, nodes = 2 }

[[scenario]]
name = "even"
zones.a = { endpoints = 1, nodes = 1 }
zones.b = { endpoints = 1, nodes = 1 }

[[scenario]]
name = "idle"
zones.a = { endpoints = 4, nodes = 0 }
"#;

    fn scenarios() -> Vec<Scenario> {
        ScenarioFile::parse(SCENARIOS).unwrap().scenarios
    }

    #[test]
    fn evaluate_scenario_scores_valid_input() {
        let outcome = evaluate_scenario(&scenarios()[0], &LocalSharedAlgorithm::default(), 100);
        assert_eq!(outcome.name, "skewed");
        assert!(!outcome.evaluation.invalid);
        assert_eq!(outcome.evaluation.endpoints, 10);
    }

    #[test]
    fn evaluate_scenario_marks_unusable_input_invalid() {
        let outcome = evaluate_scenario(&scenarios()[2], &LocalSharedAlgorithm::default(), 100);
        assert!(outcome.evaluation.invalid);
    }

    #[test]
    fn evaluate_scenario_marks_overflowing_input_invalid() {
        let file = ScenarioFile::parse(&format!(
            r#"
[[scenario]]
name = "huge"
zones.a = {{ endpoints = {}, nodes = 1 }}
zones.b = {{ endpoints = 2, nodes = 1 }}
"#,
            u32::MAX
        ))
        .unwrap();

        let outcome = evaluate_scenario(&file.scenarios[0], &LocalSharedAlgorithm::default(), 100);
        assert_eq!(outcome.name, "huge");
        assert!(outcome.evaluation.invalid);
    }

    #[tokio::test]
    async fn pipeline_writes_one_row_per_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let algorithm: Arc<dyn SliceAlgorithm> = Arc::from(algorithm_by_name("LocalShared"));

        let summary = run_pipeline(scenarios(), algorithm, &path, &ReportConfig::default())
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { rows: 3, invalid: 1 });
        let content = std::fs::read_to_string(&path).unwrap();
        let mut names: Vec<_> = content
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["even", "idle", "skewed"]);
        assert!(content.contains("idle,invalid"));
    }

    #[tokio::test]
    async fn pipeline_with_no_scenarios_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let algorithm: Arc<dyn SliceAlgorithm> = Arc::new(LocalSharedAlgorithm::default());

        let summary = run_pipeline(Vec::new(), algorithm, &path, &ReportConfig::default())
            .await
            .unwrap();

        assert_eq!(summary.rows, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn pipeline_surfaces_report_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        let algorithm: Arc<dyn SliceAlgorithm> = Arc::new(LocalSharedAlgorithm::default());

        let err = run_pipeline(scenarios(), algorithm, &path, &ReportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Create { .. }));
    }
}
