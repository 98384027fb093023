//! Configuration loading for reelsift services
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`REELSIFT_*`)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing TOML file is not fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for reelsift-search
pub const DEFAULT_PORT: u16 = 5731;

/// Internal catalog search endpoint
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8000/api/movies/";

/// OMDb metadata endpoint
pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_PORT: &str = "REELSIFT_PORT";
pub const ENV_CATALOG_URL: &str = "REELSIFT_CATALOG_URL";
pub const ENV_OMDB_URL: &str = "REELSIFT_OMDB_URL";
pub const ENV_OMDB_API_KEY: &str = "REELSIFT_OMDB_API_KEY";

/// How a batch of per-movie metadata lookups is aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentPolicy {
    /// Any single lookup failure fails the whole batch; nothing is published
    AllOrNothing,
    /// Publish the enriched subset and report failed ids individually
    #[default]
    PartialSuccess,
}

/// Bootstrap configuration loaded from TOML file
///
/// All fields are optional in the file; anything missing takes its compiled default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,

    /// Catalog search endpoint (POST, JSON body)
    pub catalog_url: String,

    /// Metadata provider endpoint (GET, `i=<externalId>&apikey=<key>`)
    pub omdb_url: String,

    /// Metadata provider API key
    pub omdb_api_key: Option<String>,

    /// Client-side request ceiling toward the metadata provider.
    /// Unset means unthrottled fan-out.
    pub omdb_requests_per_second: Option<u32>,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout_secs: u64,

    /// Aggregation policy for the enrichment fan-out
    pub enrichment_policy: EnrichmentPolicy,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            omdb_url: DEFAULT_OMDB_URL.to_string(),
            omdb_api_key: None,
            omdb_requests_per_second: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            enrichment_policy: EnrichmentPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or EnvFilter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Check the resolved configuration before any client is built
    pub fn validate(&self) -> Result<()> {
        if self.catalog_url.trim().is_empty() {
            return Err(Error::Config("catalog_url must not be empty".to_string()));
        }
        if self.omdb_url.trim().is_empty() {
            return Err(Error::Config("omdb_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.omdb_requests_per_second == Some(0) {
            return Err(Error::Config(
                "omdb_requests_per_second must be greater than zero when set".to_string(),
            ));
        }

        match self.omdb_api_key.as_deref() {
            Some(key) if is_valid_key(key) => Ok(()),
            _ => Err(Error::Config(format!(
                "OMDb API key not configured. Please configure using one of:\n\
                 1. Command line: --omdb-api-key your-key-here\n\
                 2. Environment: {}=your-key-here\n\
                 3. TOML config: omdb_api_key = \"your-key\"",
                ENV_OMDB_API_KEY
            ))),
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Values supplied on the command line; `None` defers to lower tiers
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub catalog_url: Option<String>,
    pub omdb_url: Option<String>,
    pub omdb_api_key: Option<String>,
    pub log_level: Option<String>,
}

/// Default TOML location: `<config_dir>/reelsift/reelsift.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reelsift").join("reelsift.toml"))
}

/// Load a TOML config file, falling back to defaults when the file is missing
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the effective configuration across all tiers and validate it
pub fn resolve_config(toml_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<TomlConfig> {
    // Tier 3/4: TOML file or compiled defaults
    let mut config = match toml_path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => load_toml_config(&path)?,
        None => TomlConfig::default(),
    };

    // Tier 2: Environment variables
    apply_env(&mut config)?;

    // Tier 1: Command line
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(url) = &overrides.catalog_url {
        config.catalog_url = url.clone();
    }
    if let Some(url) = &overrides.omdb_url {
        config.omdb_url = url.clone();
    }
    if let Some(key) = &overrides.omdb_api_key {
        config.omdb_api_key = Some(key.clone());
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

fn apply_env(config: &mut TomlConfig) -> Result<()> {
    if let Ok(port) = std::env::var(ENV_PORT) {
        config.port = port
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, port)))?;
    }
    if let Ok(url) = std::env::var(ENV_CATALOG_URL) {
        config.catalog_url = url;
    }
    if let Ok(url) = std::env::var(ENV_OMDB_URL) {
        config.omdb_url = url;
    }
    if let Ok(key) = std::env::var(ENV_OMDB_API_KEY) {
        if is_valid_key(&key) {
            info!("OMDb API key loaded from environment variable");
            config.omdb_api_key = Some(key);
        } else {
            warn!("{} is set but empty, ignoring", ENV_OMDB_API_KEY);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = TomlConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.omdb_url, DEFAULT_OMDB_URL);
        assert_eq!(config.enrichment_policy, EnrichmentPolicy::PartialSuccess);
        assert!(config.omdb_requests_per_second.is_none());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = TomlConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = TomlConfig {
            omdb_api_key: Some("   ".to_string()),
            ..TomlConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TomlConfig {
            omdb_api_key: Some("abc123".to_string()),
            ..TomlConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_rate() {
        let config = TomlConfig {
            omdb_api_key: Some("abc123".to_string()),
            omdb_requests_per_second: Some(0),
            ..TomlConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            omdb_api_key = "k"
            enrichment_policy = "all_or_nothing"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.enrichment_policy, EnrichmentPolicy::AllOrNothing);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.omdb_api_key.as_deref(), Some("k"));
    }
}
