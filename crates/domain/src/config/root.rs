use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::tracer::TracerConfig;

const LOCAL_CONFIG: &str = "dns-by-eye.toml";
const SYSTEM_CONFIG: &str = "/etc/dns-by-eye/config.toml";

/// Main configuration structure for dns-by-eye
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Delegation tracer budgets and root hints
    #[serde(default)]
    pub tracer: TracerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dns-by-eye.toml in current directory
    /// 3. /etc/dns-by-eye/config.toml
    /// 4. Default configuration
    ///
    /// Environment variables are applied on top of the file, CLI overrides last.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `DNS_TIMEOUT`, `DNS_LIFETIME` and `DNS_SLOW_THRESHOLD` (seconds,
    /// fractional allowed).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = env_seconds_as_ms(&lookup, "DNS_TIMEOUT")? {
            self.tracer.query_timeout_ms = ms;
        }
        if let Some(ms) = env_seconds_as_ms(&lookup, "DNS_LIFETIME")? {
            self.tracer.lifetime_ms = ms;
        }
        if let Some(ms) = env_seconds_as_ms(&lookup, "DNS_SLOW_THRESHOLD")? {
            self.tracer.slow_threshold_ms = ms;
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.tracer.query_timeout_ms = timeout;
        }
        if let Some(lifetime) = overrides.lifetime_ms {
            self.tracer.lifetime_ms = lifetime;
        }
        if !overrides.glue_resolvers.is_empty() {
            self.tracer.glue_resolvers = overrides.glue_resolvers;
        }
        if overrides.ipv6 {
            self.tracer.ipv6 = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tracer = &self.tracer;

        if tracer.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if tracer.lifetime_ms < tracer.query_timeout_ms {
            return Err(ConfigError::Validation(format!(
                "lifetime_ms ({}) is shorter than query_timeout_ms ({})",
                tracer.lifetime_ms, tracer.query_timeout_ms
            )));
        }

        if tracer.glue_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "glue_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if tracer.max_candidates == 0 {
            return Err(ConfigError::Validation(
                "max_candidates must be greater than 0".to_string(),
            ));
        }

        if tracer.root_hints.is_empty() {
            return Err(ConfigError::Validation(
                "No root hints configured".to_string(),
            ));
        }

        if tracer.glue_resolvers.is_empty() {
            return Err(ConfigError::Validation(
                "No glue resolvers configured".to_string(),
            ));
        }

        tracer
            .glue_resolver_addrs()
            .map_err(ConfigError::Validation)?;

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG).exists() {
            Some(LOCAL_CONFIG.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG).exists() {
            Some(SYSTEM_CONFIG.to_string())
        } else {
            None
        }
    }
}

fn env_seconds_as_ms<F>(lookup: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env(key.to_string(), raw.clone()))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ConfigError::Env(key.to_string(), raw));
    }
    Ok(Some((seconds * 1000.0).round() as u64))
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub lifetime_ms: Option<u64>,
    pub glue_resolvers: Vec<String>,
    pub ipv6: bool,
}
