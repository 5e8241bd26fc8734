//! Recommendation data types - the aggregate statistics served by the backend

use crate::record::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the correlation table mapping motor classification to efficiency.
pub const MOTOR_EFFICIENCY_COMBINATION: &str = "motor_classification_efficiency";

/// Filter sent with a recommendation request; also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestContext {
    pub project_no: Option<String>,
    pub tag_prefix: Option<String>,
    /// Maximum number of historical records to aggregate
    pub limit: u32,
}

impl RequestContext {
    pub fn new(limit: u32) -> Self {
        Self {
            project_no: None,
            tag_prefix: None,
            limit,
        }
    }

    pub fn with_project(mut self, project_no: impl Into<String>) -> Self {
        self.project_no = Some(project_no.into());
        self
    }

    pub fn with_tag_prefix(mut self, tag_prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(tag_prefix.into());
        self
    }

    /// Query-string pairs; unset filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(p) = self.project_no.as_deref().filter(|p| !p.is_empty()) {
            pairs.push(("project_no", p.to_string()));
        }
        if let Some(t) = self.tag_prefix.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("tag_prefix", t.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

impl std::fmt::Display for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "project={} tag_prefix={} limit={}",
            self.project_no.as_deref().unwrap_or("*"),
            self.tag_prefix.as_deref().unwrap_or("*"),
            self.limit
        )
    }
}

/// A value and how often it occurred in the analysed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount<T> {
    pub value: T,
    pub count: u32,
}

/// Statistics for a free-text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFieldStats {
    /// Ranked most-used values, most frequent first
    #[serde(default)]
    pub most_common: Vec<ValueCount<String>>,
    /// Most recent distinct values, newest first
    #[serde(default)]
    pub recent_values: Vec<String>,
}

/// Statistics for a numeric field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericFieldStats {
    #[serde(default)]
    pub suggested_default: Option<f64>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub most_common: Vec<ValueCount<f64>>,
}

/// One row of a correlation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationEntry {
    pub source_value: String,
    pub target_value: FieldValue,
    #[serde(default)]
    pub count: u32,
}

/// Correlation between two fields, e.g. motor classification → efficiency.
///
/// Field names are persistence (snake_case) keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartCombination {
    pub source_field: String,
    pub target_field: String,
    #[serde(default)]
    pub entries: Vec<CombinationEntry>,
}

/// Metadata about the aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetContext {
    #[serde(default)]
    pub total_records_analyzed: u64,
    #[serde(default)]
    pub project_no: Option<String>,
    #[serde(default)]
    pub tag_prefix: Option<String>,
}

/// Aggregated historical statistics used for suggestions.
///
/// Immutable once built; shared as `Arc<RecommendationSet>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    #[serde(default)]
    pub text_fields: BTreeMap<String, TextFieldStats>,
    #[serde(default)]
    pub numeric_fields: BTreeMap<String, NumericFieldStats>,
    #[serde(default)]
    pub smart_combinations: BTreeMap<String, SmartCombination>,
    #[serde(default)]
    pub context: SetContext,
}

impl RecommendationSet {
    /// A well-formed set with no suggestions.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text_fields.is_empty()
            && self.numeric_fields.is_empty()
            && self.smart_combinations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_skip_unset_filters() {
        let ctx = RequestContext::new(50).with_project("P-100");
        let pairs = ctx.query_pairs();
        assert_eq!(
            pairs,
            vec![("project_no", "P-100".to_string()), ("limit", "50".to_string())]
        );
    }

    #[test]
    fn test_empty_set_is_well_formed() {
        let set = RecommendationSet::empty();
        assert!(set.is_empty());
        assert_eq!(set.context.total_records_analyzed, 0);
    }

    #[test]
    fn test_partial_backend_payload_deserializes() {
        let json = r#"{
            "text_fields": {
                "service": { "most_common": [{ "value": "Crude", "count": 4 }] }
            },
            "context": { "total_records_analyzed": 9 }
        }"#;
        let set: RecommendationSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.context.total_records_analyzed, 9);
        assert!(set.text_fields["service"].recent_values.is_empty());
        assert!(set.numeric_fields.is_empty());
    }

    #[test]
    fn test_combination_target_value_untagged() {
        let json = r#"{
            "source_field": "motor_classification",
            "target_field": "motor_efficiency",
            "entries": [{ "source_value": "IE3", "target_value": 95.4, "count": 3 }]
        }"#;
        let combo: SmartCombination = serde_json::from_str(json).unwrap();
        assert_eq!(combo.entries[0].target_value, FieldValue::Number(95.4));
    }
}
