//! The `dojang` configuration file.
//!
//! Resolution order: `--config`, then `DOJANG_CONFIG` (both handled by the
//! argument parser), then `<config dir>/dojang/config.toml`. A missing
//! default file means "use defaults"; a missing explicit file is an error.

use std::path::{Path, PathBuf};

use dojang_core::ScoringProfile;
use dojang_sheets::DEFAULT_WORKSHEET;
use dojang_store::ReadFailurePolicy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DOJANG_CONFIG";

/// Where history is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// A local CSV file.
    #[default]
    Csv,
    /// A Google Sheets worksheet.
    GoogleSheets,
    /// Process memory; history is lost on exit.
    Memory,
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend kind.
    pub backend: Backend,
    /// CSV file path.
    pub path: PathBuf,
    /// Spreadsheet id, for `google_sheets`.
    pub spreadsheet_id: Option<String>,
    /// Worksheet title, for `google_sheets`.
    pub worksheet: String,
    /// Service-account key file; `GOOGLE_APPLICATION_CREDENTIALS` when unset.
    pub credentials: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_history_path(),
            spreadsheet_id: None,
            worksheet: DEFAULT_WORKSHEET.to_string(),
            credentials: None,
        }
    }
}

/// `[scoring]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Built-in profile name.
    pub profile: String,
    /// Inline profile; takes precedence over `profile`.
    pub custom: Option<ScoringProfile>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            profile: "standard".to_string(),
            custom: None,
        }
    }
}

impl ScoringConfig {
    /// The profile to score with.
    pub fn resolve(&self) -> Result<ScoringProfile> {
        if let Some(custom) = &self.custom {
            custom.validate()?;
            return Ok(custom.clone());
        }
        ScoringProfile::builtin(&self.profile).ok_or_else(|| {
            Error::config(format!(
                "unknown scoring profile '{}' (built-in: {})",
                self.profile,
                ScoringProfile::BUILTIN.join(", ")
            ))
        })
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DojangConfig {
    /// What to do when the history table cannot be read.
    pub read_failure: ReadFailurePolicy,
    /// History store.
    pub store: StoreConfig,
    /// Scoring profile.
    pub scoring: ScoringConfig,
    /// HTTP server.
    pub server: ServerConfig,
}

impl DojangConfig {
    /// Loads the configuration `explicit` or the default path points at.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) if explicit.is_some() => Err(Error::config(format!(
                "config file not found at {}",
                path.display()
            ))),
            _ => {
                tracing::debug!("No config file; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reads and validates a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::parse(path, e))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), backend = ?config.store.backend, "Loaded config");
        Ok(config)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == Backend::GoogleSheets
            && self
                .store
                .spreadsheet_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err(Error::config(
                "store.spreadsheet_id is required for the google_sheets backend",
            ));
        }
        self.scoring.resolve()?;
        Ok(())
    }

    /// Serializes as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

/// `<config dir>/dojang/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dojang").join("config.toml"))
}

/// `explicit`, else the default path.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(default_config_path)
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("dojang").join("history.csv"))
        .unwrap_or_else(|| PathBuf::from("dojang-history.csv"))
}
