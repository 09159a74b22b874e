use std::path::PathBuf;

use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};

/// Configuration for incipit.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (INCIPIT_* prefix)
/// 3. Config file (~/.config/incipit/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory scanned for audio files.
    ///
    /// Can be set via:
    /// - ENV: INCIPIT_MEDIA_DIR
    /// - Config: media_dir = "/path/to/music"
    pub media_dir: Option<PathBuf>,

    /// Path to the JSON-lines catalogue file.
    ///
    /// Can be set via:
    /// - CLI: --catalogue /path/to/catalogue.jsonl
    /// - ENV: INCIPIT_CATALOGUE_PATH
    /// - Config: catalogue_path = "/path/to/catalogue.jsonl"
    /// - Default: ~/.local/share/incipit/catalogue.jsonl
    #[serde(default = "default_catalogue_path")]
    pub catalogue_path: PathBuf,

    /// Provider identifier stamped on search results.
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_dir: None,
            catalogue_path: default_catalogue_path(),
            provider: default_provider(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/incipit/config.toml
    /// Reads environment variables with INCIPIT_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("incipit");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom catalogue path.
    ///
    /// This is used when the --catalogue CLI flag is provided.
    pub fn load_with_catalogue_path(catalogue_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.catalogue_path = catalogue_path;
        Ok(config)
    }
}

/// Get the default catalogue path.
///
/// Returns: ~/.local/share/incipit/catalogue.jsonl (or platform equivalent)
fn default_catalogue_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("incipit")
        .join("catalogue.jsonl")
}

fn default_provider() -> String {
    "local".to_string()
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/incipit/config.toml
/// - macOS: ~/Library/Application Support/incipit/config.toml
/// - Windows: %APPDATA%\incipit\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("incipit")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Incipit Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (INCIPIT_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Root directory scanned for audio files
#
# Can also be set via:
# - Environment: INCIPIT_MEDIA_DIR=/path/to/music
#media_dir = "/path/to/music"

# Path to the JSON-lines catalogue written by `incipit scan`
# and read on every refresh
#
# Can also be set via:
# - CLI: incipit --catalogue /custom/catalogue.jsonl status
# - Environment: INCIPIT_CATALOGUE_PATH=/custom/catalogue.jsonl
#
# Default: Platform-specific data directory
#catalogue_path = "/path/to/custom/catalogue.jsonl"

# Provider identifier stamped on search results
#provider = "local"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.media_dir.is_none());
        assert!(!config.catalogue_path.as_os_str().is_empty());
        assert_eq!(config.provider, "local");
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_catalogue_path() {
        let custom_path = PathBuf::from("/tmp/catalogue.jsonl");
        let config = Config::load_with_catalogue_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().catalogue_path, custom_path);
    }
}
