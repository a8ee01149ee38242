use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::{ClassificationParams, DEFAULT_WINDOW_SIZE, FUNC_STD, LOF_STD, PATHOGENIC_THRESHOLD};
use crate::services::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub ucsc: UcscSettings,
    pub oracle: OracleSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub classification: ClassificationSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct UcscSettings {
    #[serde(default = "default_ucsc_url")]
    pub base_url: String,
    #[serde(default = "default_ucsc_timeout")]
    pub timeout_secs: u64,
}

impl Default for UcscSettings {
    fn default() -> Self {
        Self {
            base_url: default_ucsc_url(),
            timeout_secs: default_ucsc_timeout(),
        }
    }
}

fn default_ucsc_url() -> String { "https://api.genome.ucsc.edu".to_string() }
fn default_ucsc_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct OracleSettings {
    pub endpoint: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

fn default_oracle_model() -> String { "evo2_7b".to_string() }
fn default_oracle_timeout() -> u64 { 300 }
fn default_max_concurrent() -> usize { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_window_size")]
    pub size: u64,
    #[serde(default)]
    pub strict_length: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            size: default_window_size(),
            strict_length: false,
        }
    }
}

fn default_window_size() -> u64 { DEFAULT_WINDOW_SIZE }

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_lof_std")]
    pub lof_std: f64,
    #[serde(default = "default_func_std")]
    pub func_std: f64,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            lof_std: default_lof_std(),
            func_std: default_func_std(),
        }
    }
}

impl From<&ClassificationSettings> for ClassificationParams {
    fn from(settings: &ClassificationSettings) -> Self {
        Self {
            threshold: settings.threshold,
            lof_std: settings.lof_std,
            func_std: settings.func_std,
        }
    }
}

fn default_threshold() -> f64 { PATHOGENIC_THRESHOLD }
fn default_lof_std() -> f64 { LOF_STD }
fn default_func_std() -> f64 { FUNC_STD }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_window_cache_size")]
    pub window_cache_size: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            window_cache_size: default_window_cache_size(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_window_cache_size() -> u64 { 256 }
fn default_cache_ttl() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            idle_timeout: Duration::from_secs(settings.idle_timeout_secs),
        }
    }
}

fn default_max_attempts() -> u32 { 3 }
fn default_initial_backoff_ms() -> u64 { 200 }
fn default_max_backoff_ms() -> u64 { 5000 }
fn default_idle_timeout() -> u64 { 120 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VARSCORE__)
    /// 5. ORACLE_URL / UCSC_API_URL
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VARSCORE__ORACLE__ENDPOINT -> oracle.endpoint
            .add_source(
                Environment::with_prefix("VARSCORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VARSCORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.size == 0 {
            return Err(ConfigError::Message("window.size must be positive".into()));
        }
        let c = &self.classification;
        if !(c.lof_std > 0.0 && c.func_std > 0.0) || !c.threshold.is_finite() {
            return Err(ConfigError::Message(
                "classification stds must be positive and threshold finite".into(),
            ));
        }
        if self.oracle.endpoint.trim().is_empty() {
            return Err(ConfigError::Message("oracle.endpoint is required".into()));
        }
        Ok(())
    }

    pub fn ucsc_timeout(&self) -> Duration {
        Duration::from_secs(self.ucsc.timeout_secs)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle.timeout_secs)
    }
}

/// Apply the short, unprefixed endpoint variables used by deployments
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let oracle_url = env::var("ORACLE_URL").ok();
    let ucsc_url = env::var("UCSC_API_URL").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(endpoint) = oracle_url {
        builder = builder.set_override("oracle.endpoint", endpoint)?;
    }
    if let Some(base_url) = ucsc_url {
        builder = builder.set_override("ucsc.base_url", base_url)?;
    }

    builder.build()
}
