//! Config validation: unknown-key detection with Levenshtein suggestions
//! and sanity checks on accepted values.
//!
//! Raw TOML is first parsed into `toml::Value` and its key tree compared
//! against the known field names, emitting "did you mean?" warnings. Serde
//! deserialization follows. Warnings never break a config.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path for `PumpCalcConfig`.
///
/// Kept in step with the structs in `app_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [api]
        "api",
        "api.base_url",
        "api.timeout_secs",
        "api.auth_token",
        // [recommendations]
        "recommendations",
        "recommendations.ttl_secs",
        "recommendations.default_limit",
        "recommendations.max_text_suggestions",
        // [export]
        "export",
        "export.status_clear_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Dotted path of every key under `value`, each table listed before its
/// children: `{ api = { base_url = "" } }` gives `["api", "api.base_url"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    table
        .iter()
        .flat_map(|(key, child)| {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            let nested = walk_toml_keys(child, &path);
            std::iter::once(path).chain(nested)
        })
        .collect()
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Edit distance in characters between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Closest known key within edit distance 3. Ties go to the
/// alphabetically first key.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Only warns; parse errors are reported by the serde pass.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(&key, &known);
            warnings.push(ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Suspicious Values
// ============================================================================

/// Values that are legal but probably not intended.
pub fn validate_suspicious_values(config: &super::PumpCalcConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if config.recommendations.ttl_secs > 86_400 {
        warnings.push(ValidationWarning {
            field: "recommendations.ttl_secs".to_string(),
            message: format!(
                "recommendations.ttl_secs = {} keeps suggestions for more than a day",
                config.recommendations.ttl_secs
            ),
            suggestion: None,
        });
    }
    if config.api.timeout_secs > 300 {
        warnings.push(ValidationWarning {
            field: "api.timeout_secs".to_string(),
            message: format!(
                "api.timeout_secs = {} is unusually long for an interactive tool",
                config.api.timeout_secs
            ),
            suggestion: None,
        });
    }
    if config.api.base_url.starts_with("http://") && config.api.auth_token.is_some() {
        let host_is_local = ["http://localhost", "http://127.0.0.1"]
            .iter()
            .any(|p| config.api.base_url.starts_with(p));
        if !host_is_local {
            warnings.push(ValidationWarning {
                field: "api.base_url".to_string(),
                message: "API token will be sent over plain HTTP".to_string(),
                suggestion: Some(config.api.base_url.replacen("http://", "https://", 1)),
            });
        }
    }

    warnings
}
