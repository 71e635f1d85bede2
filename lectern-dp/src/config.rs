//! Configuration resolution for lectern-dp
//!
//! Every value resolves CLI → ENV → TOML → compiled default, matching the
//! data-dir priority chain in lectern-common.

use lectern_common::config::{load_toml_config, resolve_api_key, resolve_data_dir};
use std::path::PathBuf;

/// Default HTTP bind address
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";

/// Default OpenAI-compatible provider endpoint
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Data directory (database + uploads)
    pub data_dir: PathBuf,
    /// HTTP bind address
    pub bind_address: String,
    /// Provider API key; None runs the deterministic local generator only
    pub openai_api_key: Option<String>,
    /// Provider base URL
    pub openai_base_url: String,
}

impl ServiceConfig {
    /// Resolve configuration from CLI arguments, environment, and TOML
    pub fn resolve(cli_data_dir: Option<&str>, cli_bind: Option<&str>) -> Self {
        let toml_config = load_toml_config();

        let data_dir = resolve_data_dir(cli_data_dir, &toml_config);

        let bind_address = cli_bind
            .map(str::to_string)
            .or_else(|| std::env::var("LECTERN_BIND_ADDRESS").ok())
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let openai_api_key = resolve_api_key(&toml_config);

        let openai_base_url = std::env::var("LECTERN_OPENAI_BASE_URL")
            .ok()
            .or_else(|| toml_config.openai_base_url.clone())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        Self {
            data_dir,
            bind_address,
            openai_api_key,
            openai_base_url,
        }
    }

    /// SQLite database path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("lectern.db")
    }

    /// Uploaded file directory
    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}
