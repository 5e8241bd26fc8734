//! Application configuration - backend, cache and export settings from TOML
//!
//! Every struct implements `Default` with the values in [`super::defaults`],
//! so running without a config file behaves like an explicit default file.

use super::defaults;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `PumpCalcConfig::load()` which searches:
/// 1. `$PUMPCALC_CONFIG` env var
/// 2. `./pumpcalc.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PumpCalcConfig {
    /// Backend connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Recommendation cache and suggestion limits
    #[serde(default)]
    pub recommendations: RecommendationConfig,

    /// Export status display
    #[serde(default)]
    pub export: ExportConfig,
}

impl PumpCalcConfig {
    /// Load configuration using the standard search order, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let config = Self::load_from_search_path();
        config.with_token_override(std::env::var(defaults::TOKEN_ENV_VAR).ok())
    }

    fn load_from_search_path() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(
                            path = %p.display(),
                            "Loaded config from {}",
                            defaults::CONFIG_ENV_VAR
                        );
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from {}, falling back",
                            defaults::CONFIG_ENV_VAR
                        );
                    }
                }
            } else {
                warn!(
                    path = %path,
                    "{} points to non-existent file, falling back",
                    defaults::CONFIG_ENV_VAR
                );
            }
        }

        // 2. Check ./pumpcalc.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "Failed to load ./{}, using defaults",
                        defaults::LOCAL_CONFIG_FILE
                    );
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", defaults::LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Unknown keys are warnings only
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        for w in super::validation::validate_suspicious_values(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Replace the configured API token when `token` is non-empty.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(t) = token.filter(|t| !t.trim().is_empty()) {
            self.api.auth_token = Some(t);
        }
        self
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Range-check every setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let url = self.api.base_url.trim();
        if url.is_empty() {
            errors.push("api.base_url must not be empty".to_string());
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "api.base_url ({url}) must start with http:// or https://"
            ));
        }
        if self.api.timeout_secs == 0 {
            errors.push("api.timeout_secs must be > 0".to_string());
        }

        let r = &self.recommendations;
        if r.ttl_secs == 0 {
            errors.push("recommendations.ttl_secs must be > 0".to_string());
        }
        if r.default_limit == 0 {
            errors.push("recommendations.default_limit must be > 0".to_string());
        }
        if r.max_text_suggestions == 0 {
            errors.push("recommendations.max_text_suggestions must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
            ConfigError::Parse(path, e) => {
                write!(f, "{} is not a valid pumpcalc config: {e}", path.display())
            }
            ConfigError::Serialize(e) => write!(f, "cannot encode settings as TOML: {e}"),
            ConfigError::Validation(problems) => {
                write!(f, "{} invalid setting(s): {}", problems.len(), problems.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

// ============================================================================
// API
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend root, e.g. `http://localhost:8000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

fn default_base_url() -> String {
    defaults::API_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    defaults::API_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            auth_token: None,
        }
    }
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Freshness window for a fetched set (seconds)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Historical records aggregated per request
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    #[serde(default = "default_max_text_suggestions")]
    pub max_text_suggestions: usize,
}

fn default_ttl_secs() -> u64 {
    defaults::RECOMMENDATION_TTL_SECS
}
fn default_limit() -> u32 {
    defaults::RECOMMENDATION_LIMIT
}
fn default_max_text_suggestions() -> usize {
    defaults::MAX_TEXT_SUGGESTIONS
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            default_limit: default_limit(),
            max_text_suggestions: default_max_text_suggestions(),
        }
    }
}

// ============================================================================
// Export
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Delay before a finished export status clears (seconds)
    #[serde(default = "default_status_clear_secs")]
    pub status_clear_secs: u64,
}

fn default_status_clear_secs() -> u64 {
    defaults::EXPORT_STATUS_CLEAR_SECS
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            status_clear_secs: default_status_clear_secs(),
        }
    }
}
