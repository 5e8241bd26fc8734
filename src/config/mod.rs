//! Configuration Module
//!
//! Backend connection, recommendation cache and export settings loaded
//! from TOML.
//!
//! ## Loading Order
//!
//! 1. `PUMPCALC_CONFIG` environment variable (path to TOML file)
//! 2. `pumpcalc.toml` in the current working directory
//! 3. Built-in defaults
//!
//! `PUMPCALC_API_TOKEN`, when set, replaces `[api].auth_token`.
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(PumpCalcConfig::load());
//!
//! // Anywhere else:
//! let ttl = config::get().recommendations.ttl_secs;
//! ```

mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::*;

use std::sync::OnceLock;

/// Global configuration, initialized once at startup.
static CONFIG: OnceLock<PumpCalcConfig> = OnceLock::new();

/// Initialize the global configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: PumpCalcConfig) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// The global configuration, or built-in defaults if `init()` was never called.
pub fn get() -> &'static PumpCalcConfig {
    CONFIG.get_or_init(|| {
        tracing::debug!("config::get() before config::init(), using defaults");
        PumpCalcConfig::default()
    })
}
