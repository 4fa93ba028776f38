//! Configuration module for reelfeed

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::path::PathBuf;

use crate::paths;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend origin, e.g. `https://api.example.com`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the paginated listing endpoint, relative to `base_url`
    #[serde(default = "default_feed_path")]
    pub feed_path: String,

    /// Items per page requested from the server (0 = server default)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Key the bearer token is stored under in the credential store
    #[serde(default = "default_token_key")]
    pub token_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Interval for `watch` in seconds (0 = refresh once)
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_feed_path() -> String {
    "/api/reels/".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            feed_path: default_feed_path(),
            page_size: default_page_size(),
            token_key: default_token_key(),
            request_timeout_secs: default_request_timeout(),
            refresh_interval_secs: 0,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// URL of the first page
    pub fn feed_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.base_url))?;
        let mut url = base
            .join(&self.feed_path)
            .with_context(|| format!("Invalid feed_path: {}", self.feed_path))?;

        if self.page_size > 0 {
            url.query_pairs_mut()
                .append_pair("page_size", &self.page_size.to_string());
        }

        Ok(url)
    }
}
