//! Google Sheets v4 backend.

use std::sync::Arc;

use async_trait::async_trait;
use dojang_core::{Revision, Table};
use dojang_gcp_auth::TokenProvider;
use dojang_store::{ReadOutcome, SheetStore, Snapshot, StoreError};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::range::{leftover_ranges, quote_sheet};

/// Sheets v4 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Worksheet used when none is configured.
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// One worksheet of a Google spreadsheet.
pub struct GoogleSheetStore {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleSheetStore {
    /// Creates a store for `Sheet1` of `spreadsheet_id`.
    pub fn new(spreadsheet_id: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: DEFAULT_WORKSHEET.to_string(),
            tokens,
        }
    }

    /// Uses worksheet `title`.
    pub fn with_worksheet(mut self, title: impl Into<String>) -> Self {
        self.worksheet = title.into();
        self
    }

    /// Sends requests to `base_url` instead of the public endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Uses `client` for API calls.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The spreadsheet id.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// The worksheet title.
    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StoreError::unavailable(format!("invalid Sheets URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::unavailable(format!("invalid Sheets URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self) -> Result<Url, StoreError> {
        let range = quote_sheet(&self.worksheet);
        self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()])
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<reqwest::Response, StoreError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| {
                if e.is_denied() {
                    StoreError::permission_denied(e.to_string())
                } else {
                    StoreError::Auth(e.to_string())
                }
            })?;
        let mut request = self.client.request(method.clone(), url.clone()).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        tracing::debug!(%method, %url, "Sheets request");
        request
            .send()
            .await
            .map_err(|e| StoreError::unavailable(format!("Sheets request failed: {e}")))
    }

    async fn fetch(&self) -> Result<ReadOutcome, StoreError> {
        let mut url = self.values_url()?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING");
        let response = self.send(Method::GET, url, None).await?;
        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            if status == StatusCode::BAD_REQUEST && message.contains("Unable to parse range") {
                tracing::debug!(worksheet = %self.worksheet, "Worksheet does not exist yet");
                return Ok(ReadOutcome::Missing);
            }
            return Err(status_error(status, message));
        }
        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::malformed(format!("unexpected Sheets response: {e}")))?;
        let grid = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(ReadOutcome::Found(Snapshot::new(Table::from_grid(grid))))
    }

    async fn add_worksheet(&self) -> Result<(), StoreError> {
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&[target.as_str()])?;
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": self.worksheet } } }]
        });
        let response = self.send(Method::POST, url, Some(body)).await?;
        check(response).await?;
        tracing::info!(spreadsheet = %self.spreadsheet_id, worksheet = %self.worksheet, "Added worksheet");
        Ok(())
    }

    async fn write_values(&self, grid: &[Vec<String>]) -> Result<(), StoreError> {
        let mut url = self.values_url()?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let values: Vec<Vec<Value>> = grid
            .iter()
            .map(|row| row.iter().map(|cell| cell_value(cell)).collect())
            .collect();
        let body = json!({
            "range": quote_sheet(&self.worksheet),
            "majorDimension": "ROWS",
            "values": values,
        });
        let response = self.send(Method::PUT, url, Some(body)).await?;
        check(response).await
    }

    async fn clear_ranges(&self, ranges: Vec<String>) -> Result<(), StoreError> {
        let url = self.url(&[self.spreadsheet_id.as_str(), "values:batchClear"])?;
        let response = self
            .send(Method::POST, url, Some(json!({ "ranges": ranges })))
            .await?;
        check(response).await
    }
}

#[async_trait]
impl SheetStore for GoogleSheetStore {
    fn describe(&self) -> String {
        "Google Sheets".to_string()
    }

    async fn read(&self) -> Result<ReadOutcome, StoreError> {
        self.fetch().await
    }

    async fn replace(&self, table: &Table, expected: &Revision) -> Result<Revision, StoreError> {
        // No conditional write exists in the Sheets API; this re-check only
        // narrows the window in which another writer can interleave.
        let current = self.fetch().await?;
        let actual = current.revision();
        if actual != *expected {
            return Err(StoreError::Conflict {
                expected: expected.clone(),
                actual,
            });
        }

        let (old_rows, old_cols) = match &current {
            ReadOutcome::Found(snapshot) => (
                snapshot.table.len() + usize::from(!snapshot.table.columns().is_empty()),
                snapshot.table.columns().len(),
            ),
            ReadOutcome::Missing => {
                self.add_worksheet().await?;
                (0, 0)
            }
        };

        let grid = table.to_grid();
        let new_cols = table.columns().len();
        if !grid.is_empty() {
            self.write_values(&grid).await?;
        }
        let leftovers = leftover_ranges(&self.worksheet, old_rows, old_cols, grid.len(), new_cols);
        if !leftovers.is_empty() {
            self.clear_ranges(leftovers).await?;
        }

        tracing::debug!(spreadsheet = %self.spreadsheet_id, worksheet = %self.worksheet, rows = table.len(), "Replaced worksheet values");
        Ok(table.revision())
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Cell text as a JSON value. Text that is exactly the rendering of a
/// number goes out as that number so the sheet stores it numerically;
/// anything else, formulas included, stays literal text.
fn cell_value(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        if n.to_string() == text {
            return Value::from(n);
        }
    }
    if let Ok(f) = text.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            if n.to_string() == text {
                return Value::Number(n);
            }
        }
    }
    Value::String(text.to_string())
}

async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => body,
    }
}

fn status_error(status: StatusCode, message: String) -> StoreError {
    let detail = format!("HTTP {}: {message}", status.as_u16());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::permission_denied(detail),
        StatusCode::NOT_FOUND => StoreError::unavailable(format!("spreadsheet not found ({detail})")),
        _ => StoreError::unavailable(detail),
    }
}

async fn check(response: reqwest::Response) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let message = error_message(response).await;
    Err(status_error(status, message))
}
