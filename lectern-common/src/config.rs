//! Configuration loading and data directory resolution
//!
//! Resolution priority for the data directory:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service configuration from the TOML config file
///
/// All fields are optional; missing values fall back to environment
/// variables or compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Data directory (database + uploaded files)
    pub data_dir: Option<String>,
    /// HTTP bind address, e.g. "127.0.0.1:8000"
    pub bind_address: Option<String>,
    /// API key for the text generation / transcription provider
    pub openai_api_key: Option<String>,
    /// Base URL for an OpenAI-compatible provider
    pub openai_base_url: Option<String>,
}

/// Load the TOML config file if present, defaults otherwise
///
/// Looks for `lectern/config.toml` under the platform config directory
/// (e.g. `~/.config/lectern/config.toml` on Linux).
pub fn load_toml_config() -> TomlConfig {
    let Some(path) = config_file_path() else {
        return TomlConfig::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring malformed config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        },
        Err(_) => TomlConfig::default(),
    }
}

/// Platform config file path (`<config dir>/lectern/config.toml`)
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lectern").join("config.toml"))
}

/// Resolve the data directory following the priority order
pub fn resolve_data_dir(cli_arg: Option<&str>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("LECTERN_DATA_DIR") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.data_dir {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent default
    dirs::data_local_dir()
        .map(|d| d.join("lectern"))
        .unwrap_or_else(|| PathBuf::from("lectern-data"))
}

/// Resolve the provider API key: ENV → TOML
///
/// `LECTERN_OPENAI_API_KEY` takes priority over the conventional
/// `OPENAI_API_KEY`, which takes priority over the config file. Returns
/// `None` when no non-empty key is configured; the service then runs with
/// the deterministic local generator.
pub fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    for source in [
        std::env::var("LECTERN_OPENAI_API_KEY").ok(),
        std::env::var("OPENAI_API_KEY").ok(),
        toml_config.openai_api_key.clone(),
    ] {
        if let Some(key) = source {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
    }
    None
}

/// Ensure a directory exists, creating it (and parents) if missing
pub fn ensure_directory_exists(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "Path exists but is not a directory: {}",
                dir.display()
            )));
        }
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;
    tracing::info!("Created directory: {}", dir.display());
    Ok(())
}
