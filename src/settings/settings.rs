use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub credentials: Credentials,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_me_path")]
    pub me_path: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_renewal_timeout_ms")]
    pub renewal_timeout_ms: u64,
}

impl Api {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn renewal_timeout(&self) -> Duration {
        Duration::from_millis(self.renewal_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub backend: String, // "memory" or "file"
    #[serde(default = "default_credentials_path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

fn default_login_path() -> String {
    "/api/auth/login/".to_string()
}

fn default_refresh_path() -> String {
    "/api/auth/refresh/".to_string()
}

fn default_me_path() -> String {
    "/api/auth/me/".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_renewal_timeout_ms() -> u64 {
    10_000
}

fn default_credentials_path() -> String {
    ".pocketbook/session.json".to_string()
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Reads the TOML file, then lets `POCKETBOOK__SECTION__KEY` variables
/// override individual values.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("POCKETBOOK").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
