//! Field values and numeric parsing
//!
//! Two readings of a numeric field:
//!
//! - [`parse_numeric`] is strict: the whole trimmed text must be a finite
//!   decimal number. Used for validation hints.
//! - [`numeric_or_zero`] is what the recalculation engine uses. Text is read
//!   up to the end of its leading decimal number, the way a browser form's
//!   `parseFloat` does (`"12 bar"` reads as 12, `"12,5"` as 12). Text without
//!   a leading number, `inf` and `NaN` read as 0.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single field value as entered in the form or returned by the backend.
///
/// Numbers typed into the form arrive as text; calculated fields are stored
/// as fixed-precision decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Null,
}

/// Why a value could not be read as a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("value is missing")]
    Missing,
    #[error("value is empty")]
    Empty,
    #[error("'{0}' is not a number")]
    Invalid(String),
    #[error("value is not finite")]
    NonFinite,
}

impl FieldValue {
    /// True when the value is unset, null, or blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Render the value as the form would display it.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Null => String::new(),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(n: Option<f64>) -> Self {
        n.map_or(FieldValue::Null, FieldValue::Number)
    }
}

/// Parse a value as a decimal number.
pub fn parse_numeric(value: Option<&FieldValue>) -> Result<f64, ParseError> {
    let n = match value {
        None | Some(FieldValue::Null) => return Err(ParseError::Missing),
        Some(FieldValue::Number(n)) => *n,
        Some(FieldValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(ParseError::Empty);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| ParseError::Invalid(trimmed.to_string()))?
        }
    };
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ParseError::NonFinite)
    }
}

/// Leading decimal number of `text`, ignoring leading whitespace.
fn leading_number(text: &str) -> Option<f64> {
    static LEADING: OnceLock<Regex> = OnceLock::new();
    let re = LEADING.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?")
            .expect("leading number regex is valid")
    });
    re.find(text.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Lenient reading used by the recalculation engine; unreadable is zero.
pub fn numeric_or_zero(value: Option<&FieldValue>) -> f64 {
    match value {
        Some(FieldValue::Text(s)) => leading_number(s).unwrap_or(0.0),
        other => parse_numeric(other).unwrap_or(0.0),
    }
}

/// Format a number with a fixed count of fractional digits.
///
/// Negative zero is normalised so clamped results always read `0.000`.
pub fn format_fixed(value: f64, precision: usize) -> String {
    let rendered = format!("{:.*}", precision, value);
    if rendered.starts_with('-') && rendered[1..].chars().all(|c| c == '0' || c == '.') {
        rendered[1..].to_string()
    } else {
        rendered
    }
}
