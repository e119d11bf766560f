//! Route table and handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dojang_core::{AssessmentInput, FormCatalogue};
use dojang_store::{SubmissionOutcome, SubmissionService};
use serde::Serialize;

use crate::error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: SubmissionService,
    catalogue: Arc<FormCatalogue>,
}

impl AppState {
    /// Wraps a submission service.
    pub fn new(service: SubmissionService) -> Self {
        Self {
            service,
            catalogue: Arc::new(FormCatalogue::new()),
        }
    }

    /// The submission service.
    pub fn service(&self) -> &SubmissionService {
        &self.service
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `healthy` while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Store description.
    pub store: String,
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/form", get(form))
        .route("/assessments", post(submit))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        store: state.service.store().describe(),
    })
}

async fn form(State(state): State<AppState>) -> Json<FormCatalogue> {
    Json(state.catalogue.as_ref().clone())
}

async fn submit(
    State(state): State<AppState>,
    body: Result<Json<AssessmentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), ApiError> {
    let Json(input) = body?;
    let outcome = state.service.submit(input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
