//! Configuration for Keygate.
//!
//! Settings live in `~/.keygate/config.toml`. A missing file is not an error;
//! every field has a default. The verification service root is resolved once at
//! startup in this order:
//!
//! 1. `KEYGATE_BASE_URL` environment variable
//! 2. `[api] base_url` in the config file (`${VAR}` references are expanded)
//! 3. [`DEFAULT_BASE_URL`]
//!
//! ```toml
//! [api]
//! base_url = "https://verify.example.com"
//! request_timeout_secs = 30
//!
//! [app]
//! high_contrast = false
//! ascii_only = false
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use keygate_client::{BaseUrl, BaseUrlError, DEFAULT_REQUEST_TIMEOUT_SECS};
use keygate_types::UiOptions;

/// Environment variable that overrides `[api] base_url`.
pub const BASE_URL_ENV: &str = "KEYGATE_BASE_URL";
/// Used when neither the environment nor the config file names a service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Default, Deserialize)]
pub struct KeygateConfig {
    pub api: Option<ApiConfig>,
    pub app: Option<AppConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for masks and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable spinner animation.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    BaseUrl(#[from] BaseUrlError),
}

/// Everything the verification client needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub base_url: BaseUrl,
    pub request_timeout_secs: u64,
}

/// Replace `${VAR}` references with environment values.
///
/// Unset variables expand to the empty string; an unclosed `${` is kept verbatim.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

impl KeygateConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
                reduced_motion: app.reduced_motion,
            })
            .unwrap_or_default()
    }
}

/// Resolve service settings from the process environment and optional config.
pub fn resolve_service(config: Option<&KeygateConfig>) -> Result<ServiceSettings, ConfigError> {
    resolve_service_with(config, env::var(BASE_URL_ENV).ok())
}

/// Resolve service settings with an explicit environment override.
pub fn resolve_service_with(
    config: Option<&KeygateConfig>,
    env_override: Option<String>,
) -> Result<ServiceSettings, ConfigError> {
    let api = config.and_then(|cfg| cfg.api.as_ref());

    let raw = env_override
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            api.and_then(|api| api.base_url.as_deref())
                .map(expand_env_vars)
                .filter(|value| !value.trim().is_empty())
        })
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let request_timeout_secs = api
        .and_then(|api| api.request_timeout_secs)
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    Ok(ServiceSettings {
        base_url: BaseUrl::parse(&raw)?,
        request_timeout_secs,
    })
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".keygate").join("config.toml"))
}
