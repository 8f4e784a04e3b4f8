use std::time::Duration;

use crate::locales::LocaleTable;

pub const ENV_BASE_URL: &str = "MAX_PRICE_BASE_URL";
pub const ENV_PROXY_API: &str = "MAX_PRICE_PROXY_API";
pub const ENV_PROXY_REQUIRED: &str = "MAX_PRICE_PROXY_REQUIRED";
pub const ENV_LOCALES: &str = "MAX_PRICE_LOCALES";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read locale table {path}: {source}")]
    LocalesRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid locale table {path}: {source}")]
    LocalesParse {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid boolean for {name}: '{value}'")]
    InvalidBool { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Site root, without a trailing slash.
    pub base_url: String,
    /// Proxy provisioning URL with a `{country}` placeholder. `None` disables proxies.
    pub proxy_api: Option<String>,
    /// Abort the request when no proxy could be provisioned instead of fetching directly.
    pub proxy_required: bool,
    pub locales: LocaleTable,
    pub proxy_timeout: Duration,
    pub page_timeout: Duration,
    pub fallback_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: crate::BASE_URL.to_string(),
            proxy_api: None,
            proxy_required: false,
            locales: LocaleTable::default(),
            proxy_timeout: Duration::from_secs(25),
            page_timeout: Duration::from_secs(45),
            fallback_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }

        config.proxy_api = lookup(ENV_PROXY_API).filter(|v| !v.trim().is_empty());

        if let Some(value) = lookup(ENV_PROXY_REQUIRED) {
            config.proxy_required = parse_bool(ENV_PROXY_REQUIRED, &value)?;
        }

        if let Some(path) = lookup(ENV_LOCALES).filter(|v| !v.trim().is_empty()) {
            let json = std::fs::read_to_string(&path).map_err(|source| {
                ConfigError::LocalesRead {
                    path: path.clone(),
                    source,
                }
            })?;
            config.locales = LocaleTable::from_json(&json)
                .map_err(|source| ConfigError::LocalesParse { path, source })?;
        }

        log::debug!(
            "Config: base_url={}, proxy={}, proxy_required={}, {} locale(s)",
            config.base_url,
            if config.proxy_api.is_some() { "configured" } else { "disabled" },
            config.proxy_required,
            config.locales.len()
        );

        Ok(config)
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}
