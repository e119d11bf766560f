//! The submission pipeline.
//!
//! One submission runs `validate → build record → score → append → render
//! chart` as a single linear task. Validation and scoring happen before
//! the store is touched, so a bad input never writes anything.

use std::sync::Arc;

use chrono::NaiveDate;
use dojang_core::{AssessmentInput, RadarChart, ScoringProfile, Scores, SubmissionId};
use serde::Serialize;

use crate::append::{append_record, AppendReport, ReadFailurePolicy};
use crate::error::StoreError;
use crate::store::SheetStore;

/// Why a submission failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SubmitError {
    /// The input was rejected; nothing was stored.
    #[error("{0}")]
    Validation(dojang_core::Error),

    /// Scores could not be computed; nothing was stored.
    #[error("{0}")]
    Scoring(dojang_core::Error),

    /// The table changed while this submission was being written.
    #[error("Upload failed: {0}")]
    Conflict(StoreError),

    /// Reading or writing the table failed.
    #[error("Upload failed: {0}")]
    Upload(StoreError),
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        if err.is_conflict() {
            SubmitError::Conflict(err)
        } else {
            SubmitError::Upload(err)
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    /// Submission id, as logged.
    pub id: SubmissionId,
    /// Confirmation shown to the evaluator.
    pub message: String,
    /// Trimmed athlete name.
    pub athlete_name: String,
    /// Resolved evaluation date.
    pub eval_date: NaiveDate,
    /// Derived scores.
    pub scores: Scores,
    /// Radar chart as an SVG document.
    pub chart_svg: String,
    /// Advisory warnings.
    pub warnings: Vec<String>,
    /// What the append did.
    pub report: AppendReport,
}

/// Runs submissions against one store with one scoring profile.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn SheetStore>,
    profile: ScoringProfile,
    policy: ReadFailurePolicy,
}

impl SubmissionService {
    /// Creates a service using the `standard` profile and strict reads.
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self {
            store,
            profile: ScoringProfile::standard(),
            policy: ReadFailurePolicy::default(),
        }
    }

    /// Uses `profile` for scoring.
    pub fn with_profile(mut self, profile: ScoringProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Uses `policy` when the existing table cannot be read.
    pub fn with_read_failure_policy(mut self, policy: ReadFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn SheetStore> {
        &self.store
    }

    /// The scoring profile.
    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Submits an assessment, defaulting its date to today (local time).
    pub async fn submit(
        &self,
        input: AssessmentInput,
    ) -> Result<SubmissionOutcome, SubmitError> {
        self.submit_on(input, chrono::Local::now().date_naive()).await
    }

    /// Submits an assessment, defaulting its date to `today`.
    pub async fn submit_on(
        &self,
        input: AssessmentInput,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let id = SubmissionId::new();
        let store = self.store.describe();

        let assessment = input.validate(today).map_err(|e| {
            tracing::info!(submission_id = %id, error = %e, "Submission rejected");
            SubmitError::Validation(e)
        })?;
        let record = assessment.to_record();

        let scores = self.profile.score(&assessment).map_err(|e| {
            tracing::info!(submission_id = %id, profile = %self.profile.name, error = %e, "Scoring failed");
            SubmitError::Scoring(e)
        })?;
        let chart = RadarChart::from_scores(&scores)
            .map_err(SubmitError::Scoring)?
            .with_title(assessment.athlete_name());

        let report = append_record(self.store.as_ref(), &record, self.policy)
            .await
            .map_err(|e| {
                tracing::error!(submission_id = %id, store = %store, error = %e, "Upload failed");
                SubmitError::from(e)
            })?;

        tracing::info!(
            submission_id = %id,
            store = %store,
            athlete = %assessment.athlete_name(),
            rows_before = report.rows_before,
            rows_after = report.rows_after,
            "Assessment uploaded"
        );

        Ok(SubmissionOutcome {
            id,
            message: format!(
                "Success! {}'s assessment uploaded to {store}!",
                assessment.athlete_name()
            ),
            athlete_name: assessment.athlete_name().to_string(),
            eval_date: assessment.eval_date(),
            scores,
            chart_svg: chart.to_svg(),
            warnings: assessment.warnings(),
            report,
        })
    }
}
