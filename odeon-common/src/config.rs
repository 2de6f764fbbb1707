//! Configuration loading for Odeon services
//!
//! Resolution priority for every key:
//! 1. Environment variable (highest)
//! 2. TOML config file
//! 3. Compiled default
//!
//! Credentials found in more than one source log a warning, since that is a
//! common sign of a stale config file shadowed by deployment env vars.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen address for the HTTP server
    pub bind_addr: String,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory receiving uploaded image/content assets
    pub assets_dir: PathBuf,
    /// Base URL of the remote book catalog API
    pub catalog_base_url: String,
    /// Catalog API client id header value
    pub catalog_client_id: String,
    /// Catalog API client secret header value
    pub catalog_client_secret: String,
    /// Shared admin token; empty disables admin gating (test/dev)
    pub admin_token: String,
    /// SMTP relay URL for outbound notification mail
    pub smtp_url: String,
    /// Fixed sender identity for notification mail
    pub mail_from: String,
}

/// Raw TOML file contents (all keys optional)
#[derive(Debug, Default, Deserialize)]
struct TomlSettings {
    bind_addr: Option<String>,
    database_path: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    catalog_base_url: Option<String>,
    catalog_client_id: Option<String>,
    catalog_client_secret: Option<String>,
    admin_token: Option<String>,
    smtp_url: Option<String>,
    mail_from: Option<String>,
}

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";
const DEFAULT_CATALOG_URL: &str = "https://openapi.naver.com/v1/search/book.json";
const DEFAULT_SMTP_URL: &str = "smtp://127.0.0.1:25";
const DEFAULT_MAIL_FROM: &str = "Odeon <no-reply@odeon.example>";

impl Settings {
    /// Load settings from the default config file location plus environment.
    pub fn load() -> Result<Self> {
        let toml = match default_config_path() {
            Some(path) if path.exists() => read_toml(&path)?,
            _ => TomlSettings::default(),
        };
        Ok(Self::resolve(toml))
    }

    /// Load settings from an explicit config file plus environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let toml = if path.exists() {
            read_toml(path)?
        } else {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        };
        Ok(Self::resolve(toml))
    }

    fn resolve(toml: TomlSettings) -> Self {
        warn_on_shadowed_secret("ODEON_CATALOG_CLIENT_ID", &toml.catalog_client_id);
        warn_on_shadowed_secret("ODEON_CATALOG_CLIENT_SECRET", &toml.catalog_client_secret);
        warn_on_shadowed_secret("ODEON_ADMIN_TOKEN", &toml.admin_token);

        Self {
            bind_addr: resolve_str("ODEON_BIND_ADDR", toml.bind_addr, DEFAULT_BIND_ADDR),
            database_path: resolve_path("ODEON_DATABASE_PATH", toml.database_path, || {
                default_data_dir().join("odeon.db")
            }),
            assets_dir: resolve_path("ODEON_ASSETS_DIR", toml.assets_dir, || {
                default_data_dir().join("assets")
            }),
            catalog_base_url: resolve_str(
                "ODEON_CATALOG_BASE_URL",
                toml.catalog_base_url,
                DEFAULT_CATALOG_URL,
            ),
            catalog_client_id: resolve_str("ODEON_CATALOG_CLIENT_ID", toml.catalog_client_id, ""),
            catalog_client_secret: resolve_str(
                "ODEON_CATALOG_CLIENT_SECRET",
                toml.catalog_client_secret,
                "",
            ),
            admin_token: resolve_str("ODEON_ADMIN_TOKEN", toml.admin_token, ""),
            smtp_url: resolve_str("ODEON_SMTP_URL", toml.smtp_url, DEFAULT_SMTP_URL),
            mail_from: resolve_str("ODEON_MAIL_FROM", toml.mail_from, DEFAULT_MAIL_FROM),
        }
    }

    /// True when admin gating is active (a token is configured)
    pub fn admin_gating_enabled(&self) -> bool {
        !self.admin_token.is_empty()
    }
}

fn read_toml(path: &Path) -> Result<TomlSettings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

fn resolve_str(env_var: &str, toml_value: Option<String>, default: &str) -> String {
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return value;
        }
    }
    toml_value.unwrap_or_else(|| default.to_string())
}

fn resolve_path(
    env_var: &str,
    toml_value: Option<PathBuf>,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return PathBuf::from(value);
        }
    }
    toml_value.unwrap_or_else(default)
}

fn warn_on_shadowed_secret(env_var: &str, toml_value: &Option<String>) {
    let in_env = std::env::var(env_var).map(|v| !v.trim().is_empty()) == Ok(true);
    if in_env && toml_value.is_some() {
        warn!(
            "{} set in both environment and config file; using environment value",
            env_var
        );
    }
}

/// Default config file path for the platform (`<config dir>/odeon/odeon.toml`)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("odeon").join("odeon.toml"))
}

/// Default data directory (`<data dir>/odeon`)
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("odeon"))
        .unwrap_or_else(|| PathBuf::from("./odeon_data"))
}
