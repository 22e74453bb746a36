//! slicegrid-eval — score slice groups and write evaluation reports.
//!
//! # Architecture
//!
//! ```text
//! run_pipeline
//!   ├── producers (one blocking task per scenario)
//!   │     Scenario → Region → SliceAlgorithm → evaluate()
//!   ├── mpsc channel of ScenarioOutcome
//!   └── consumer (single blocking task)
//!         ReportWriter → CSV file, flushed and closed once
//! ```

pub mod error;
pub mod evaluator;
pub mod pipeline;
pub mod report;

pub use error::{ReportError, ReportResult};
pub use evaluator::{Evaluation, evaluate};
pub use pipeline::{ScenarioOutcome, evaluate_scenario, run_pipeline};
pub use report::{REPORT_HEADER, ReportWriter, RunSummary, Scores, write_report};
