//! Common paths for reelfeed data storage
//!
//! Everything lives under ~/.config/reelfeed/ on all platforms:
//! - config.toml - User configuration
//! - credentials.enc - Encrypted credentials

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the reelfeed data directory (~/.config/reelfeed/), creating it if needed
pub fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("reelfeed");
    fs::create_dir_all(&dir).context("Failed to create reelfeed directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/reelfeed/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("config.toml"))
}

/// Get the credentials file path (~/.config/reelfeed/credentials.enc)
pub fn credentials_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("credentials.enc"))
}
