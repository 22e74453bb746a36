//! CSV evaluation report.
//!
//! One row per scenario under [`REPORT_HEADER`]. Rows that cannot be scored
//! are written with every value column set to `invalid` rather than
//! aborting the report.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use slicegrid_core::ReportConfig;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::{ReportError, ReportResult};
use crate::evaluator::Evaluation;
use crate::pipeline::ScenarioOutcome;

pub const REPORT_HEADER: [&str; 8] = [
    "input name",
    "score",
    "in-zone-traffic score",
    "deviation score",
    "slice score",
    "max deviation",
    "mean deviation",
    "SD of deviation",
];

const INVALID: &str = "invalid";

/// Scores derived from an [`Evaluation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    pub total: f64,
    pub in_zone_traffic: f64,
    pub deviation: f64,
    pub slice: f64,
}

impl Scores {
    /// `None` when the evaluation is invalid or publishes no slices.
    pub fn compute(evaluation: &Evaluation, config: &ReportConfig) -> Option<Self> {
        if evaluation.invalid || evaluation.endpoint_slices == 0 {
            return None;
        }

        let in_zone_traffic = evaluation.in_zone_traffic * 100.0;

        let max_score = 100.0 - evaluation.max_deviation * 100.0;
        let mean_score = 100.0 - evaluation.mean_deviation * 100.0;
        let deviation = 0.5 * max_score + 0.5 * mean_score;

        // Fewest slices the endpoints could possibly fit in, relative to
        // what the partition actually needs.
        let minimal_slices = evaluation
            .endpoints
            .div_ceil(config.endpoints_per_slice.max(1));
        let slice = f64::from(minimal_slices) / f64::from(evaluation.endpoint_slices) * 100.0;

        let total = config.in_zone_traffic_weight * in_zone_traffic
            + config.deviation_weight * deviation
            + config.slice_weight * slice;

        Some(Self {
            total,
            in_zone_traffic,
            deviation,
            slice,
        })
    }
}

/// Rows written so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub invalid: usize,
}

/// Streams report rows into any writer.
///
/// Rows are buffered; write errors may only surface on [`finish`](Self::finish).
pub struct ReportWriter<W: Write> {
    out: csv::Writer<W>,
    config: ReportConfig,
    summary: RunSummary,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, config: ReportConfig) -> Self {
        let out = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);
        Self {
            out,
            config,
            summary: RunSummary::default(),
        }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.out.write_record(REPORT_HEADER)?;
        Ok(())
    }

    pub fn write_row(&mut self, name: &str, evaluation: &Evaluation) -> io::Result<()> {
        let mut record = vec![name.to_string()];
        match Scores::compute(evaluation, &self.config) {
            Some(scores) => {
                record.push(format!("{:.4}", scores.total));
                record.push(format!("{:.4}", scores.in_zone_traffic));
                record.push(format!("{:.4}", scores.deviation));
                record.push(format!("{:.4}", scores.slice));
                record.push(format!("{:.4}%", evaluation.max_deviation * 100.0));
                record.push(format!("{:.4}%", evaluation.mean_deviation * 100.0));
                record.push(format!("{:.4}", evaluation.deviation_sd));
            }
            None => {
                record.extend(std::iter::repeat_n(INVALID.to_string(), REPORT_HEADER.len() - 1));
                self.summary.invalid += 1;
            }
        }
        self.out.write_record(&record)?;
        self.summary.rows += 1;
        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Flush buffered rows and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        self.out
            .into_inner()
            .map_err(|err| io::Error::new(err.error().kind(), err.to_string()))
    }
}

/// Drain `outcomes` into a CSV file at `path`.
///
/// The file is flushed and closed exactly once, whether or not writing
/// succeeded. A write error takes precedence over a close error.
///
/// Blocks on the channel, so call it from a blocking thread
/// (e.g. `tokio::task::spawn_blocking`), never from async code.
pub fn write_report(
    path: &Path,
    mut outcomes: mpsc::Receiver<ScenarioOutcome>,
    config: &ReportConfig,
) -> ReportResult<RunSummary> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "writing report");

    let mut writer = ReportWriter::new(file, config.clone());
    let written = write_rows(&mut writer, &mut outcomes);
    // Stop producers from queueing more rows into a dead sink.
    outcomes.close();

    let closed = writer.finish().and_then(|file| file.sync_all());
    if let Err(err) = &closed {
        error!(path = %path.display(), error = %err, "failed to close report");
    }

    let summary = written.map_err(ReportError::Write)?;
    closed.map_err(ReportError::Close)?;
    Ok(summary)
}

fn write_rows<W: Write>(
    writer: &mut ReportWriter<W>,
    outcomes: &mut mpsc::Receiver<ScenarioOutcome>,
) -> io::Result<RunSummary> {
    writer.write_header()?;
    while let Some(outcome) = outcomes.blocking_recv() {
        writer.write_row(&outcome.name, &outcome.evaluation)?;
    }
    Ok(writer.summary())
}
