use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "HEADLESS_AGENTS_API_KEY";
pub const BASE_URL_VAR: &str = "HEADLESS_AGENTS_BASE_URL";
pub const TIMEOUT_VAR: &str = "HEADLESS_AGENTS_TIMEOUT_MS";

pub const DEFAULT_BASE_URL: &str = "https://api.headlessagents.ai/call/";

fn default_timeout() -> u64 {
    30_000
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Agent ids are appended verbatim, so this normally ends with `/`.
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Config {
    /// 从进程环境变量创建配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = match lookup(BASE_URL_VAR).filter(|v| !v.is_empty()) {
            Some(value) => {
                Url::parse(&value).map_err(|source| ConfigError::InvalidBaseUrl {
                    value: value.clone(),
                    source,
                })?;
                value
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout_ms = match lookup(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => default_timeout(),
        };

        Ok(Self {
            api_key,
            base_url,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
