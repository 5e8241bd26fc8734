//! System-wide default constants.
//!
//! Grouped by subsystem; the config structs use these as their `Default`.

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PUMPCALC_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pumpcalc.toml";

/// Environment variable that overrides `[api].auth_token`.
pub const TOKEN_ENV_VAR: &str = "PUMPCALC_API_TOKEN";

// ============================================================================
// Backend API
// ============================================================================

pub const API_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP client timeout for backend requests (seconds).
pub const API_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Recommendations
// ============================================================================

/// How long a fetched recommendation set counts as fresh (seconds).
pub const RECOMMENDATION_TTL_SECS: u64 = 300;

/// Historical records aggregated per request.
pub const RECOMMENDATION_LIMIT: u32 = 50;

/// Cap on entries in a text field's suggestion list.
pub const MAX_TEXT_SUGGESTIONS: usize = 10;

// ============================================================================
// Export
// ============================================================================

/// Delay before a finished export status returns to idle (seconds).
pub const EXPORT_STATUS_CLEAR_SECS: u64 = 3;
