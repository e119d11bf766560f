//! Handlers for `dojang config` subcommands.

use std::path::{Path, PathBuf};

use crate::config::{resolve_config_path, DojangConfig};
use crate::error::{Error, Result};

/// The resolved config path and whether the file exists.
pub fn cmd_config_path(explicit: Option<&Path>) -> Result<(PathBuf, bool)> {
    let path = resolve_config_path(explicit).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    let exists = path.exists();
    Ok((path, exists))
}

/// Writes a default config file, refusing to overwrite unless `force`.
pub fn cmd_config_init(explicit: Option<&Path>, force: bool) -> Result<PathBuf> {
    let (path, exists) = cmd_config_path(explicit)?;
    if exists && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let toml = DojangConfig::default().to_toml_string()?;
    std::fs::write(&path, toml).map_err(|e| Error::io_with_path(e, &path))?;
    tracing::info!(path = %path.display(), "Wrote default config");
    Ok(path)
}

/// The effective configuration as TOML.
pub fn cmd_config_show(explicit: Option<&Path>) -> Result<String> {
    DojangConfig::load(explicit)?.to_toml_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_refuse_then_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert_eq!(cmd_config_path(Some(&path)).unwrap(), (path.clone(), false));
        assert_eq!(cmd_config_init(Some(&path), false).unwrap(), path);
        assert!(cmd_config_path(Some(&path)).unwrap().1);

        let err = cmd_config_init(Some(&path), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        cmd_config_init(Some(&path), true).unwrap();
    }

    #[test]
    fn test_show_reflects_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9999\n").unwrap();
        let shown = cmd_config_show(Some(&path)).unwrap();
        assert!(shown.contains("port = 9999"));
        assert!(shown.contains("profile = \"standard\""));
    }
}
