//! Persistence mapping - camelCase record keys to the backend's snake_case schema
//!
//! The backend's "new template" columns duplicate some fields: `service` is
//! also stored as `liquid_type`, and several single operating values are
//! replicated into `_max` / `_normal` / `_min` triplets. The tables below
//! reproduce that layout exactly; consolidating them is a schema decision
//! for the backend owners.

use super::catalog::{self, keys, FieldKind, FIELDS};
use super::{EngineeringRecord, FieldValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Workflow status sent with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Work in progress, no validation of required fields
    Draft,
    /// Issued for review
    Ifr,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "draft",
            SubmissionStatus::Ifr => "ifr",
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(SubmissionStatus::Draft),
            "ifr" => Ok(SubmissionStatus::Ifr),
            other => Err(format!("unknown status '{other}' (expected draft or ifr)")),
        }
    }
}

/// Fields copied verbatim into an additional column.
pub const DUPLICATED_FIELDS: &[(&str, &str)] = &[(keys::SERVICE, "liquid_type")];

/// Fields replicated into `<api_key>_max`, `<api_key>_normal`, `<api_key>_min`.
pub const TRIPLET_FIELDS: &[&str] = &[
    keys::FLOW_RATE,
    keys::OPERATING_TEMPERATURE,
    keys::DENSITY,
    keys::VISCOSITY,
    keys::VAPOR_PRESSURE,
];

const TRIPLET_SUFFIXES: [&str; 3] = ["max", "normal", "min"];

/// Snake_case persistence key for a camelCase field.
pub fn api_key(key: &str) -> Option<&'static str> {
    catalog::field(key).map(|f| f.api_key)
}

/// JSON value for one field.
///
/// Numeric fields holding a readable number are sent as JSON numbers, blanks
/// as null. Unreadable numeric text is sent verbatim so the backend's own
/// validation message reaches the user.
fn to_json(kind: FieldKind, value: &FieldValue) -> Value {
    match (kind, value) {
        (_, FieldValue::Null) => Value::Null,
        (_, FieldValue::Number(n)) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        (FieldKind::Text, FieldValue::Text(s)) => Value::String(s.clone()),
        (FieldKind::Numeric, FieldValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(s.clone()))
            }
        }
    }
}

/// Build the submission payload for `POST /pump-calculations/`.
pub fn to_persistence(record: &EngineeringRecord, status: SubmissionStatus) -> Map<String, Value> {
    let mut payload = Map::new();

    for spec in FIELDS {
        let value = record
            .get(spec.key)
            .map_or(Value::Null, |v| to_json(spec.kind, v));
        payload.insert(spec.api_key.to_string(), value);
    }

    for (key, column) in DUPLICATED_FIELDS {
        if let Some(spec) = catalog::field(key) {
            let value = payload.get(spec.api_key).cloned().unwrap_or(Value::Null);
            payload.insert((*column).to_string(), value);
        }
    }

    for key in TRIPLET_FIELDS {
        if let Some(spec) = catalog::field(key) {
            let value = payload.get(spec.api_key).cloned().unwrap_or(Value::Null);
            for suffix in TRIPLET_SUFFIXES {
                payload.insert(format!("{}_{}", spec.api_key, suffix), value.clone());
            }
        }
    }

    let unmapped = record.keys().filter(|k| catalog::field(k).is_none()).count();
    if unmapped > 0 {
        debug!(unmapped, "Record carries keys outside the field catalog; not submitted");
    }

    payload.insert("status".to_string(), Value::String(status.as_str().to_string()));
    payload
}

/// Rebuild a record from a persisted row.
///
/// Only primary columns are read; duplicated and triplet columns are ignored.
pub fn from_persistence(row: &Map<String, Value>) -> EngineeringRecord {
    FIELDS
        .iter()
        .filter_map(|spec| {
            let value = match row.get(spec.api_key)? {
                Value::Null => FieldValue::Null,
                Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
                Value::String(s) => FieldValue::Text(s.clone()),
                Value::Bool(b) => FieldValue::Text(b.to_string()),
                other => FieldValue::Text(other.to_string()),
            };
            Some((spec.key.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_to_snake_keys() {
        assert_eq!(api_key(keys::TOTAL_DISCHARGE_PRESSURE), Some("total_discharge_pressure"));
        assert_eq!(api_key(keys::CV_RATIO), Some("cv_ratio"));
        assert_eq!(api_key("unknownField"), None);
    }

    #[test]
    fn test_payload_includes_status_and_every_field() {
        let record = EngineeringRecord::new().with(keys::TAG_NO, "P-101");
        let payload = to_persistence(&record, SubmissionStatus::Ifr);
        assert_eq!(payload["status"], json!("ifr"));
        assert_eq!(payload["tag_no"], json!("P-101"));
        assert_eq!(payload["cv_max"], Value::Null);
        for spec in FIELDS {
            assert!(payload.contains_key(spec.api_key), "missing {}", spec.api_key);
        }
    }

    #[test]
    fn test_service_copied_into_liquid_type() {
        let record = EngineeringRecord::new().with(keys::SERVICE, "Crude Transfer");
        let payload = to_persistence(&record, SubmissionStatus::Draft);
        assert_eq!(payload["service"], json!("Crude Transfer"));
        assert_eq!(payload["liquid_type"], json!("Crude Transfer"));
    }

    #[test]
    fn test_triplets_replicate_single_value() {
        let record = EngineeringRecord::new().with(keys::DENSITY, "850");
        let payload = to_persistence(&record, SubmissionStatus::Draft);
        assert_eq!(payload["density"], json!(850.0));
        assert_eq!(payload["density_max"], json!(850.0));
        assert_eq!(payload["density_normal"], json!(850.0));
        assert_eq!(payload["density_min"], json!(850.0));
        assert_eq!(payload["flow_rate_normal"], Value::Null);
    }

    #[test]
    fn test_numeric_text_is_sent_as_number_and_garbage_verbatim() {
        let record = EngineeringRecord::new()
            .with(keys::TOTAL_DISCHARGE_PRESSURE, "2.90")
            .with(keys::CV_MAX, "eighty");
        let payload = to_persistence(&record, SubmissionStatus::Draft);
        assert_eq!(payload["total_discharge_pressure"], json!(2.9));
        assert_eq!(payload["cv_max"], json!("eighty"));
    }

    #[test]
    fn test_from_persistence_reads_primary_columns() {
        let row = json!({
            "id": 42,
            "tag_no": "P-7",
            "cv_max": 80,
            "liquid_type": "ignored",
            "density_max": 900,
            "revision": null
        });
        let record = from_persistence(row.as_object().unwrap());
        assert_eq!(record.get(keys::TAG_NO), Some(&FieldValue::from("P-7")));
        assert_eq!(record.number(keys::CV_MAX), 80.0);
        assert_eq!(record.get(keys::REVISION), Some(&FieldValue::Null));
        assert!(record.get(keys::DENSITY).is_none());
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("IFR".parse::<SubmissionStatus>(), Ok(SubmissionStatus::Ifr));
        assert!("final".parse::<SubmissionStatus>().is_err());
    }
}
