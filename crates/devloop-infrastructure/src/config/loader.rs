//! Configuration loader
//!
//! Handles loading configuration from TOML files, environment variables,
//! and default values through Figment.

use std::env;
use std::path::{Path, PathBuf};

use devloop_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

use crate::config::{
    HarnessConfig, HttpConfig, LoggingConfig, PollingConfig, ProcessConfig, ResilienceConfig,
};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `HarnessConfig::default()`
    /// 2. TOML configuration file (explicit path, or the first default location found)
    /// 3. Environment variables with prefix (e.g., `DEVLOOP__HTTP__BASE_URL`)
    pub fn load(&self) -> Result<HarnessConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(HarnessConfig::default()));

        match &self.config_path {
            Some(config_path) if config_path.exists() => {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            }
            Some(config_path) => {
                return Err(Error::configuration(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
            None => {
                if let Some(default_path) = Self::find_default_config_path() {
                    figment = figment.merge(Toml::file(&default_path));
                    log_config_loaded(&default_path, true);
                }
            }
        }

        // Double underscore separates nested keys: DEVLOOP__POLLING__INTERVAL_MS
        let prefix = format!("{}{CONFIG_ENV_SEPARATOR}", self.env_prefix);
        figment = figment.merge(Env::prefixed(&prefix).split(CONFIG_ENV_SEPARATOR));

        let config: HarnessConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &HarnessConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context(format!(
            "Failed to write config file {}",
            path.as_ref().display()
        ))?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find the first existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(format!(".{DEFAULT_CONFIG_DIR}"))
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a loaded configuration
///
/// Performs validation of all configuration sections.
pub fn validate_config(config: &HarnessConfig) -> Result<()> {
    validate_http_config(&config.http)?;
    validate_polling_config(&config.polling)?;
    validate_process_config(&config.process)?;
    validate_resilience_config(&config.resilience)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<()> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(Error::configuration(format!(
            "Base URL must start with http:// or https://, got '{}'",
            config.base_url
        )));
    }
    if config.request_timeout_ms == 0 {
        return Err(Error::configuration("Request timeout cannot be 0"));
    }
    Ok(())
}

fn validate_polling_config(config: &PollingConfig) -> Result<()> {
    if config.interval_ms == 0 {
        return Err(Error::configuration("Poll interval cannot be 0"));
    }
    if config.readiness_timeout_secs == 0 || config.reload_timeout_secs == 0 {
        return Err(Error::configuration("Poll timeouts cannot be 0"));
    }
    if config.interval() > config.readiness_timeout() || config.interval() > config.reload_timeout()
    {
        return Err(Error::configuration(
            "Poll interval cannot be longer than the poll timeouts",
        ));
    }
    Ok(())
}

fn validate_process_config(config: &ProcessConfig) -> Result<()> {
    if config.output_buffer_lines == 0 {
        return Err(Error::configuration("Output buffer size cannot be 0"));
    }
    Ok(())
}

fn validate_resilience_config(config: &ResilienceConfig) -> Result<()> {
    if config.failure_threshold == 0 || config.window_size == 0 {
        return Err(Error::configuration(
            "Circuit breaker failure threshold and window size cannot be 0",
        ));
    }
    if config.failure_threshold > config.window_size {
        return Err(Error::configuration(
            "Circuit breaker failure threshold cannot exceed its window size",
        ));
    }
    if config.half_open_max_requests == 0 {
        return Err(Error::configuration(
            "Circuit breaker must allow at least one half-open request",
        ));
    }
    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    parse_log_level(&config.level).map(|_| ())
}

/// Configuration builder for programmatic configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: HarnessConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.http.base_url = base_url.into();
        self
    }

    /// Set HTTP configuration
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Set polling configuration
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.config.polling = polling;
        self
    }

    /// Set process configuration
    pub fn with_process(mut self, process: ProcessConfig) -> Self {
        self.config.process = process;
        self
    }

    /// Set resilience configuration
    pub fn with_resilience(mut self, resilience: ResilienceConfig) -> Self {
        self.config.resilience = resilience;
        self
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build the configuration without validation
    pub fn build(self) -> HarnessConfig {
        self.config
    }

    /// Build and validate the configuration
    pub fn build_validated(self) -> Result<HarnessConfig> {
        validate_config(&self.config)?;
        Ok(self.config)
    }
}
