use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::error::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = "helpdesk";
const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_BASE_URL: &str = "http://localhost:8888";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub default_category: Option<Category>,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub config_dir: PathBuf,
}

/// On-disk form, edited by `helpdesk config init`. Values stay as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub base_url: Option<String>,
    pub default_category: Option<String>,
    pub timeout_secs: Option<String>,
    pub cache_ttl_secs: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, config_directory()?, |key| env::var(key).ok())
    }

    /// Layers environment overrides over the stored values, then defaults.
    pub fn resolve(
        stored: StoredConfig,
        config_dir: PathBuf,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let base_url = env_var("HELPDESK_BASE_URL")
            .or(stored.base_url)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Configuration(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let default_category = match stored.default_category.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(Category::from_str(raw).ok_or_else(
                || AppError::Configuration(format!("unknown default category '{raw}'")),
            )?),
            _ => None,
        };

        let timeout_secs = parse_secs(
            "timeout",
            env_var("HELPDESK_TIMEOUT_SECS").or(stored.timeout_secs),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let cache_ttl_secs = parse_secs(
            "cache TTL",
            env_var("HELPDESK_CACHE_TTL_SECS").or(stored.cache_ttl_secs),
            DEFAULT_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_category,
            request_timeout: Duration::from_secs(timeout_secs),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            config_dir,
        })
    }
}

fn parse_secs(field: &str, raw: Option<String>, default: u64) -> AppResult<u64> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<u64>().map_err(|_| {
            AppError::Configuration(format!(
                "{field} must be a whole number of seconds, got '{value}'"
            ))
        }),
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("could not determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
