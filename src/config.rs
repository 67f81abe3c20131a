//! Client configuration
//!
//! Read from `config.json` in the platform config directory:
//! ```json
//! {
//!   "api_url": "http://localhost:5000/api",
//!   "timeout_secs": 15,
//!   "auth_header": "bearer",
//!   "currency_symbol": "₹"
//! }
//! ```
//! Every field is optional. `FINTRACK_API_URL` overrides `api_url`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub(crate) const API_URL_ENV: &str = "FINTRACK_API_URL";

/// How the auth token is attached to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum AuthHeader {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `x-auth-token: <token>`
    XAuthToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) api_url: String,
    pub(crate) timeout_secs: u64,
    pub(crate) auth_header: AuthHeader,
    pub(crate) currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 15,
            auth_header: AuthHeader::Bearer,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Config {
    /// Load `config.json` from `config_dir`, then apply environment overrides.
    pub(crate) fn load(config_dir: &Path) -> Result<Self> {
        let mut config = Self::from_file(&config_dir.join("config.json"))?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.set_api_url(&url);
        }
        Ok(config)
    }

    /// A missing file yields defaults. A malformed one is an error.
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        let url = std::mem::replace(&mut config.api_url, DEFAULT_API_URL.to_string());
        config.set_api_url(&url);
        Ok(config)
    }

    pub(crate) fn set_api_url(&mut self, url: &str) {
        let trimmed = url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.api_url = trimmed.to_string();
        }
    }
}
