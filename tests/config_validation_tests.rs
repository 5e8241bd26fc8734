//! Config Validation Tests
//!
//! Typo detection, range validation and file loading for `PumpCalcConfig`,
//! exercised independently from the engines.

use pumpcalc::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use pumpcalc::config::{ConfigError, PumpCalcConfig};
use std::io::Write;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_recommendations_section_warns_with_suggestion() {
    let toml_str = r#"
[recommendations]
ttl_seconds = 120
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("ttl_seconds"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("recommendations.ttl_secs")
    );
}

#[test]
fn typo_in_api_section_warns() {
    let toml_str = r#"
[api]
base_ulr = "http://localhost:8000/api"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("api.base_url"));
}

#[test]
fn unknown_section_warns_without_breaking_load() {
    let toml_str = r#"
[dashboard]
theme = "dark"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2, "section and key both unknown");

    let config: PumpCalcConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config, PumpCalcConfig::default());
}

#[test]
fn every_known_key_is_accepted() {
    let known = known_config_keys();
    for key in &known {
        assert_eq!(suggest_correction(key, &known).as_deref(), Some(*key));
    }
}

#[test]
fn malformed_toml_yields_no_key_warnings() {
    assert!(validate_unknown_keys("[api\nbase_url = ").is_empty());
}

// ============================================================================
// File Loading
// ============================================================================

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_from_file_reads_all_sections() {
    let file = write_temp(
        r#"
[api]
base_url = "https://calc.example.com/api/"
timeout_secs = 5

[recommendations]
ttl_secs = 60
default_limit = 25

[export]
status_clear_secs = 1
"#,
    );
    let config = PumpCalcConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(config.recommendations.ttl_secs, 60);
    assert_eq!(config.recommendations.default_limit, 25);
    assert_eq!(config.recommendations.max_text_suggestions, 10);
    assert_eq!(config.export.status_clear_secs, 1);
}

#[test]
fn load_from_file_rejects_invalid_values() {
    let file = write_temp(
        r#"
[api]
timeout_secs = 0
"#,
    );
    match PumpCalcConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("timeout_secs"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn load_from_file_reports_parse_errors_with_path() {
    let file = write_temp("[recommendations]\nttl_secs = \"soon\"\n");
    let err = PumpCalcConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PumpCalcConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pumpcalc.toml");

    let mut config = PumpCalcConfig::default();
    config.api.auth_token = Some("token-123".to_string());
    config.recommendations.max_text_suggestions = 5;
    config.save_to_file(&path).unwrap();

    let loaded = PumpCalcConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}
