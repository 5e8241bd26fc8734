//! Engineering record - the flat field map edited by the pump form
//!
//! ## Layout
//!
//! - **catalog**: static metadata (label, unit, section, calculated flag)
//! - **value**: field values plus the explicit numeric parsing API
//! - **mapping**: camelCase ↔ snake_case translation for the persistence API

pub mod catalog;
pub mod mapping;
pub mod value;

pub use catalog::{field, is_calculated, keys, FieldKind, FieldSpec, Section, FIELDS};
pub use mapping::{from_persistence, to_persistence, SubmissionStatus};
pub use value::{format_fixed, numeric_or_zero, parse_numeric, FieldValue, ParseError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat mapping from camelCase field key to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineeringRecord {
    fields: BTreeMap<String, FieldValue>,
}

/// A numeric field whose current value is not a plain number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub label: &'static str,
    pub error: String,
    /// What the recalculation engine reads instead
    pub read_as: f64,
}

impl EngineeringRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Builder-style setter, handy for fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Numeric value of a field, zero when unset or unparsable.
    pub fn number(&self, key: &str) -> f64 {
        numeric_or_zero(self.get(key))
    }

    /// Numeric value of a field with the parse failure reported.
    pub fn parse(&self, key: &str) -> Result<f64, ParseError> {
        parse_numeric(self.get(key))
    }

    /// True when the field holds a non-blank value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_blank())
    }

    /// Copy every entry of `updates` into this record.
    pub fn merge(&mut self, updates: EngineeringRecord) {
        self.fields.extend(updates.fields);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Numeric input fields that hold something which is not a number.
    ///
    /// Blank fields are not reported here; see [`Self::missing_required`].
    pub fn numeric_issues(&self) -> Vec<FieldIssue> {
        FIELDS
            .iter()
            .filter(|f| f.kind == FieldKind::Numeric && !f.calculated)
            .filter(|f| self.has_value(f.key))
            .filter_map(|f| {
                self.parse(f.key).err().map(|e| FieldIssue {
                    field: f.key,
                    label: f.label,
                    error: e.to_string(),
                    read_as: self.number(f.key),
                })
            })
            .collect()
    }

    /// Required fields that are still blank.
    pub fn missing_required(&self) -> Vec<&'static FieldSpec> {
        FIELDS
            .iter()
            .filter(|f| f.required && !self.has_value(f.key))
            .collect()
    }
}

impl FromIterator<(String, FieldValue)> for EngineeringRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EngineeringRecord {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_defaults_to_zero() {
        let record = EngineeringRecord::new().with(keys::CV_MAX, "abc");
        assert_eq!(record.number(keys::CV_MAX), 0.0);
        assert_eq!(record.number(keys::CV_MIN), 0.0);
    }

    #[test]
    fn test_numeric_issues_reports_only_present_garbage() {
        let record = EngineeringRecord::new()
            .with(keys::CV_MAX, "8O")
            .with(keys::CV_MIN, "")
            .with(keys::PUMP_EFFICIENCY, "75");
        let issues = record.numeric_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, keys::CV_MAX);
        assert!(issues[0].error.contains("8O"));
        assert_eq!(issues[0].read_as, 8.0);
    }

    #[test]
    fn test_missing_required() {
        let record = EngineeringRecord::new().with(keys::PROJECT_NO, "P-100");
        let missing: Vec<_> = record.missing_required().iter().map(|f| f.key).collect();
        assert!(!missing.contains(&keys::PROJECT_NO));
        assert!(missing.contains(&keys::TAG_NO));
        assert!(!missing.contains(&keys::TOTAL_DISCHARGE_PRESSURE));
    }

    #[test]
    fn test_merge_overwrites() {
        let mut record = EngineeringRecord::new().with(keys::REVISION, "1");
        record.merge(EngineeringRecord::new().with(keys::REVISION, "2").with(keys::CLIENT, "ACME"));
        assert_eq!(record.get(keys::REVISION), Some(&FieldValue::from("2")));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_json_shape_is_flat() {
        let record = EngineeringRecord::new()
            .with(keys::CV_MAX, 80.0)
            .with(keys::TAG_NO, "P-101A");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["cvMax"], serde_json::json!(80.0));
        assert_eq!(json["tagNo"], serde_json::json!("P-101A"));
    }
}
