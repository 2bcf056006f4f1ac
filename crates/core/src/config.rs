//! Layered application configuration.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Origin of the game-server API.
pub const DEFAULT_BASE_URL: &str = "https://online-go.com";

/// Template written on first run so the knobs are discoverable.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# sgfdl configuration.
#
# Values here override the built-in defaults and are themselves overridden
# by SGFDL_* environment variables (e.g. SGFDL_BOARD_SIZE=13).

# base_url = "https://online-go.com"
# board_size = 9
# delay_min_ms = 500
# delay_max_ms = 1000
# stop_on_empty = false
"#;

/// Settings shared by every stage of the download pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base origin the relative API paths are resolved against.
    pub base_url: String,
    /// Board width a game must have to be downloaded.
    pub board_size: u32,
    /// Lower bound of the randomized delay between remote requests.
    pub delay_min_ms: u64,
    /// Upper bound of the randomized delay between remote requests.
    pub delay_max_ms: u64,
    /// Treat an empty history page as the end of the archive instead of
    /// walking the requested range to its last page.
    pub stop_on_empty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            board_size: 9,
            delay_min_ms: 500,
            delay_max_ms: 1000,
            stop_on_empty: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load configuration, reading the optional file at `path` when given.
    ///
    /// Built-in defaults are overridden by the file, and `SGFDL_*`
    /// environment variables override both.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(Environment::with_prefix("SGFDL"))
            .build()
            .context("failed to assemble configuration")?;
        settings
            .try_deserialize()
            .context("failed to parse configuration")
    }
}

/// Location of the user-level configuration file, when the platform has a
/// config directory at all.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sgfdl").join("config.toml"))
}

/// Write a commented configuration template if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = match default_config_path() {
        Some(path) => path,
        None => return Ok(()),
    };
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_a_file() -> Result<()> {
        let config = AppConfig::load_from(None)?;
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.board_size, 9);
        assert_eq!(config.delay_min_ms, 500);
        assert_eq!(config.delay_max_ms, 1000);
        assert!(!config.stop_on_empty);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "board_size = 13\nstop_on_empty = true\n")?;

        let config = AppConfig::load_from(Some(path))?;
        assert_eq!(config.board_size, 13);
        assert!(config.stop_on_empty);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        Ok(())
    }

    #[test]
    fn template_only_restates_the_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;

        let config = AppConfig::load_from(Some(path))?;
        assert_eq!(config.board_size, AppConfig::default().board_size);
        assert_eq!(config.base_url, AppConfig::default().base_url);
        Ok(())
    }

    #[test]
    fn missing_file_is_tolerated() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(Some(dir.path().join("absent.toml")))?;
        assert_eq!(config.board_size, 9);
        Ok(())
    }
}
