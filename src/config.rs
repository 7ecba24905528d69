use std::{env, path::PathBuf, time::Duration};

use serde::Serialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_MAX_WORKERS: usize = 50;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_PROBE_USER_AGENT: &str = "VLC/3.0.18 LibVLC/3.0.18";
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub target_country: String,
    pub output_dir: PathBuf,
    pub allow_insecure_transports: bool,
    pub validator: ValidatorConfig,
    pub radio_browser: RadioBrowserConfig,
    pub radio_garden: RadioGardenConfig,
    pub logos: LogoConfig,
}

/// Settings for the playlist validation pipeline.
///
/// The defaults are 50 concurrent probes, a 3 second timeout per request, a
/// VLC user agent, and a progress event every 50 completed probes.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatorConfig {
    pub max_workers: usize,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub progress_interval: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadioBrowserConfig {
    pub default_base_url: String,
    pub use_mirrors: bool,
    pub user_agent: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadioGardenConfig {
    pub base_url: String,
    pub places_timeout_ms: u64,
    pub page_timeout_ms: u64,
    pub resolve_timeout_ms: u64,
    pub place_concurrency: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoConfig {
    #[serde(skip_serializing)]
    pub logo_dev_token: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let allow_insecure_transports = env_bool("ALLOW_INSECURE_TRANSPORT").unwrap_or(false);
        let target_country = env::var("TARGET_COUNTRY").unwrap_or_else(|_| "Romania".into());
        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let config = Self {
            target_country: target_country.trim().to_string(),
            output_dir,
            allow_insecure_transports,
            validator: ValidatorConfig::from_env()?,
            radio_browser: RadioBrowserConfig::from_env()?,
            radio_garden: RadioGardenConfig::from_env()?,
            logos: LogoConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_country.is_empty() {
            return Err(ConfigError::Message("TARGET_COUNTRY must be provided.".into()));
        }
        self.validator.validate()?;
        if self.radio_browser.user_agent.trim().is_empty() {
            return Err(ConfigError::Message(
                "A Radio Browser user agent must be provided.".into(),
            ));
        }
        if self.radio_garden.place_concurrency == 0 {
            return Err(ConfigError::Message(
                "RADIO_GARDEN_PLACE_CONCURRENCY must be greater than zero.".into(),
            ));
        }
        for (label, raw) in [
            ("Radio Browser", &self.radio_browser.default_base_url),
            ("Radio Garden", &self.radio_garden.base_url),
        ] {
            let url = Url::parse(raw)
                .map_err(|err| ConfigError::Message(format!("Invalid {label} base URL: {err}")))?;
            if url.scheme() != "https" && !self.allow_insecure_transports {
                return Err(ConfigError::Message(format!(
                    "{label} endpoints must use HTTPS unless ALLOW_INSECURE_TRANSPORT=true"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            user_agent: DEFAULT_PROBE_USER_AGENT.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ValidatorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_workers: env_usize("VALIDATOR_MAX_WORKERS", DEFAULT_MAX_WORKERS)?,
            timeout_ms: env_u64("VALIDATOR_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)?,
            user_agent: env::var("VALIDATOR_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_PROBE_USER_AGENT.to_string()),
            progress_interval: env_usize("VALIDATOR_PROGRESS_INTERVAL", DEFAULT_PROGRESS_INTERVAL)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::Message(
                "VALIDATOR_MAX_WORKERS must be greater than zero.".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "VALIDATOR_TIMEOUT_MS must be greater than zero.".into(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::Message(
                "VALIDATOR_PROGRESS_INTERVAL must be greater than zero.".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RadioBrowserConfig {
    fn from_env() -> Result<Self, ConfigError> {
        const DEFAULT_BASE_URL: &str = "https://de1.api.radio-browser.info";

        Ok(Self {
            default_base_url: env::var("RADIO_BROWSER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            use_mirrors: env_bool("RADIO_BROWSER_USE_MIRRORS").unwrap_or(true),
            user_agent: env::var("RADIO_BROWSER_USER_AGENT")
                .unwrap_or_else(|_| "radio-playlist-rs/0.1".to_string()),
            timeout_ms: env_u64("RADIO_BROWSER_TIMEOUT_MS", 30_000)?,
        })
    }
}

impl RadioGardenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env::var("RADIO_GARDEN_BASE_URL")
                .unwrap_or_else(|_| "https://radio.garden".to_string()),
            places_timeout_ms: env_u64("RADIO_GARDEN_PLACES_TIMEOUT_MS", 30_000)?,
            page_timeout_ms: env_u64("RADIO_GARDEN_PAGE_TIMEOUT_MS", 15_000)?,
            resolve_timeout_ms: env_u64("RADIO_GARDEN_RESOLVE_TIMEOUT_MS", 10_000)?,
            place_concurrency: env_usize("RADIO_GARDEN_PLACE_CONCURRENCY", 4)?,
        })
    }
}

impl LogoConfig {
    fn from_env() -> Self {
        let logo_dev_token = env::var("LOGO_DEV_TOKEN")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self { logo_dev_token }
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Message(format!("{key} must be a valid u64"))),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Message(format!("{key} must be a valid usize"))),
        Err(_) => Ok(default),
    }
}

fn env_bool(key: &str) -> Option<bool> {
    match env::var(key) {
        Ok(value) => match value.to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Err(_) => None,
    }
}
