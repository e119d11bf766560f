//! Builds the configured store.

use std::sync::Arc;

use dojang_gcp_auth::{ServiceAccountKey, ServiceAccountTokenProvider};
use dojang_sheets::GoogleSheetStore;
use dojang_store::{CsvStore, MemoryStore, SheetStore, SubmissionService};

use crate::config::{Backend, DojangConfig, StoreConfig};
use crate::error::{Error, Result};

/// Opens the store `config` describes.
///
/// For Google Sheets the service-account key is loaded here, so a bad key
/// file fails before any submission is attempted.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn SheetStore>> {
    let store: Arc<dyn SheetStore> = match config.backend {
        Backend::Csv => Arc::new(CsvStore::new(&config.path)),
        Backend::Memory => Arc::new(MemoryStore::default()),
        Backend::GoogleSheets => {
            let spreadsheet_id = config.spreadsheet_id.as_deref().ok_or_else(|| {
                Error::config("store.spreadsheet_id is required for the google_sheets backend")
            })?;
            let key = ServiceAccountKey::load(config.credentials.as_deref())?;
            tracing::debug!(client_email = %key.client_email, "Loaded service-account key");
            let tokens = Arc::new(ServiceAccountTokenProvider::for_sheets(key));
            Arc::new(
                GoogleSheetStore::new(spreadsheet_id, tokens).with_worksheet(&config.worksheet),
            )
        }
    };
    tracing::info!(backend = ?config.backend, store = %store.describe(), "Opened store");
    Ok(store)
}

/// Builds the submission service for `config`.
pub fn submission_service(config: &DojangConfig) -> Result<SubmissionService> {
    Ok(SubmissionService::new(open_store(&config.store)?)
        .with_profile(config.scoring.resolve()?)
        .with_read_failure_policy(config.read_failure))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_store_describes_its_path() {
        let config = StoreConfig {
            path: "/tmp/history.csv".into(),
            ..StoreConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert!(store.describe().contains("history.csv"));
    }

    #[test]
    fn test_missing_key_file_fails_early() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: Backend::GoogleSheets,
            spreadsheet_id: Some("1AbC".to_string()),
            credentials: Some(dir.path().join("absent.json")),
            ..StoreConfig::default()
        };
        let err = open_store(&config).err().unwrap();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_service_uses_configured_profile() {
        let mut config = DojangConfig::default();
        config.store.backend = Backend::Memory;
        config.scoring.profile = "rubric".to_string();
        let service = submission_service(&config).unwrap();
        assert_eq!(service.profile().name, "rubric");
    }
}
