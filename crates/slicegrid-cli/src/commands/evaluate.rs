use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use slicegrid_balance::{SliceAlgorithm, algorithm_from_config};
use slicegrid_core::{EvalConfig, ScenarioFile};

pub async fn evaluate(
    input: &Path,
    output: &Path,
    algorithm: Option<&str>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let mut config = match config {
        Some(path) => EvalConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EvalConfig::default(),
    };
    if let Some(name) = algorithm {
        config.strategy.algorithm = name.to_string();
    }

    let scenarios = ScenarioFile::from_file(input)
        .with_context(|| format!("Failed to load scenarios from {}", input.display()))?
        .scenarios;
    let algorithm: Arc<dyn SliceAlgorithm> = Arc::from(algorithm_from_config(&config.strategy));

    match slicegrid_eval::run_pipeline(scenarios, algorithm, output, &config.report).await {
        Ok(summary) => {
            println!("✓ Evaluated {} scenarios", summary.rows);
            println!("  Invalid: {}", summary.invalid);
            println!("  Report:  {}", output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Evaluation failed: {e}");
            Err(e.into())
        }
    }
}
