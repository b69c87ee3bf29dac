use crate::errors::{Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:3001";
pub const CONFIG_PATH_ENV: &str = "CARPRICE_CONFIG";
pub const BACKEND_BASE_URL_ENV: &str = "BACKEND_BASE_URL";
const DEFAULT_CONFIG_FILE: &str = "carprice.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_backend_base_url() -> String {
    DEFAULT_BACKEND_BASE_URL.to_string()
}
fn default_request_timeout() -> String {
    "30s".to_string()
}
fn default_log_format() -> String {
    "term".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            request_timeout: default_request_timeout(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Config::from_toml(&text)
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(self.request_timeout.trim())
            .map_err(|e| Error::Config(format!("request_timeout: {}", e)))
    }
}

fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::load(&config_path()).unwrap_or_else(|e| {
        eprintln!("Warning: {}. Using defaults.", e);
        Config::default()
    })
});

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Looks a key up in the environment first, then in the loaded file.
pub fn get(name: &str) -> Result<String> {
    if let Some(value) = non_blank_env(name) {
        return Ok(value);
    }
    let from_file = match name {
        "BACKEND_BASE_URL" => Some(&CONFIG.backend_base_url),
        "REQUEST_TIMEOUT" => Some(&CONFIG.request_timeout),
        "LOG_FORMAT" => Some(&CONFIG.log_format),
        _ => None,
    };
    from_file
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{} is not set", name)))
}

/// Base address of the price service, falling back to the local default.
pub fn backend_base_url() -> String {
    let url = get(BACKEND_BASE_URL_ENV).unwrap_or_else(|_| default_backend_base_url());
    url.trim_end_matches('/').to_string()
}

pub fn request_timeout() -> Result<Duration> {
    let raw = get("REQUEST_TIMEOUT")?;
    humantime::parse_duration(&raw).map_err(|e| Error::Config(format!("REQUEST_TIMEOUT: {}", e)))
}
