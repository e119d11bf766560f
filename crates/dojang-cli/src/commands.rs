//! Handlers for the `submit`, `form`, `history` and `serve` commands.
//!
//! Handlers return values and leave printing to `main`, so they can be
//! tested without capturing stdout.

use std::path::Path;

use dojang_api::Server;
use dojang_core::{AssessmentInput, FormCatalogue};
use dojang_store::{SubmissionOutcome, SubmissionService};

use crate::backend::{open_store, submission_service};
use crate::config::DojangConfig;
use crate::error::{Error, Result};

/// Reads an assessment from a `.json` file, or from TOML otherwise.
pub fn load_input(path: &Path) -> Result<AssessmentInput> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content).map_err(|e| Error::parse(path, e))
    } else {
        toml::from_str(&content).map_err(|e| Error::parse(path, e))
    }
}

/// Submits the assessment in `file`, writing the chart to `chart` if given.
pub async fn cmd_submit(
    service: &SubmissionService,
    file: &Path,
    chart: Option<&Path>,
) -> Result<SubmissionOutcome> {
    let input = load_input(file)?;
    let outcome = service.submit(input).await?;
    if let Some(chart) = chart {
        std::fs::write(chart, &outcome.chart_svg).map_err(|e| Error::io_with_path(e, chart))?;
        tracing::info!(path = %chart.display(), "Wrote radar chart");
    }
    Ok(outcome)
}

/// Human-readable summary of a submission.
pub fn format_outcome(outcome: &SubmissionOutcome) -> String {
    let mut lines = vec![outcome.message.clone()];
    for score in outcome.scores.iter() {
        lines.push(format!(
            "  {:<24} {:.2}",
            score.label.replace('\n', " "),
            score.value
        ));
    }
    for warning in &outcome.warnings {
        lines.push(format!("warning: {warning}"));
    }
    if !outcome.report.added_columns.is_empty() {
        lines.push(format!(
            "note: new columns added to history: {}",
            outcome.report.added_columns.join(", ")
        ));
    }
    lines.join("\n")
}

/// The form catalogue as JSON, or a TOML input template.
pub fn cmd_form(template: bool) -> Result<String> {
    if template {
        toml::to_string_pretty(&AssessmentInput::default())
            .map_err(|e| Error::config(format!("cannot render template: {e}")))
    } else {
        serde_json::to_string_pretty(&FormCatalogue::new())
            .map_err(|e| Error::config(format!("cannot render catalogue: {e}")))
    }
}

/// Stored history, trimmed to the most recent rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    /// Store description.
    pub store: String,
    /// Whether the table exists yet.
    pub exists: bool,
    /// Total data rows.
    pub rows: usize,
    /// Header.
    pub columns: Vec<String>,
    /// Last rows, oldest first.
    pub recent: Vec<Vec<String>>,
}

impl HistorySummary {
    /// Renders the summary, showing the first `width` columns of each row.
    pub fn render(&self, width: usize) -> String {
        if !self.exists {
            return format!("{}: no history yet", self.store);
        }
        let mut lines = vec![format!("{}: {} rows", self.store, self.rows)];
        if !self.recent.is_empty() {
            let header: Vec<_> = self.columns.iter().take(width).cloned().collect();
            lines.push(header.join(" | "));
            for row in &self.recent {
                let cells: Vec<_> = row.iter().take(width).cloned().collect();
                lines.push(cells.join(" | "));
            }
        }
        lines.join("\n")
    }
}

/// Reads the configured store and keeps the last `limit` rows.
pub async fn cmd_history(config: &DojangConfig, limit: usize) -> Result<HistorySummary> {
    let store = open_store(&config.store)?;
    let outcome = store.read().await?;
    let exists = matches!(outcome, dojang_store::ReadOutcome::Found(_));
    let table = outcome.into_table();
    let skip = table.len().saturating_sub(limit);
    Ok(HistorySummary {
        store: store.describe(),
        exists,
        rows: table.len(),
        columns: table.columns().to_vec(),
        recent: table.rows()[skip..].to_vec(),
    })
}

/// Serves the HTTP API until Ctrl-C.
pub async fn cmd_serve(config: &DojangConfig) -> Result<()> {
    let service = submission_service(config)?;
    Server::new(service)
        .bind(&config.server.addr())
        .await?
        .serve()
        .await?;
    Ok(())
}
