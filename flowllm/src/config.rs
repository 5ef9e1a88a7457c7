//! Engine configuration.
//!
//! Settings can be built in code, deserialized with serde, or read from the
//! environment with [`EngineConfig::from_env`].

use crate::errors::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `default_max_parallel`.
pub const ENV_MAX_PARALLEL: &str = "FLOWLLM_MAX_PARALLEL";
/// Environment variable overriding the log filter.
pub const ENV_LOG: &str = "FLOWLLM_LOG";
/// Environment variable enabling JSON log output.
pub const ENV_LOG_JSON: &str = "FLOWLLM_LOG_JSON";
/// Environment variable overriding the memory window.
pub const ENV_MEMORY_WINDOW: &str = "FLOWLLM_MEMORY_WINDOW";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `flowllm=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker bound used by `ParallelChain::from_config`.
    #[serde(default = "default_max_parallel")]
    pub default_max_parallel: usize,
    /// Exchanges kept by `BufferMemory::from_config`; 0 keeps everything.
    #[serde(default)]
    pub memory_window: usize,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_parallel() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_parallel: default_max_parallel(),
            memory_window: 0,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default parallelism.
    #[must_use]
    pub const fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.default_max_parallel = max_parallel;
        self
    }

    /// Sets the memory window.
    #[must_use]
    pub const fn with_memory_window(mut self, window: usize) -> Self {
        self.memory_window = window;
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Builds a configuration from defaults overridden by `FLOWLLM_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Config` if a numeric or boolean variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Config` if a numeric or boolean variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_PARALLEL) {
            config.default_max_parallel = parse_usize(ENV_MAX_PARALLEL, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MEMORY_WINDOW) {
            config.memory_window = parse_usize(ENV_MEMORY_WINDOW, &raw)?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            config.logging.filter = filter;
        }
        if let Some(raw) = lookup(ENV_LOG_JSON) {
            config.logging.json = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(FlowError::Config(format!("{ENV_LOG_JSON}: expected a boolean, got '{other}'")))
                }
            };
        }
        Ok(config)
    }
}

fn parse_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|e| FlowError::Config(format!("{name}: {e}")))
}
