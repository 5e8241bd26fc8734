//! Suggestion queries over a fetched [`RecommendationSet`]
//!
//! Pure lookups. Nothing here mutates a record; `auto_fill` returns the
//! partial record the caller merges into the live form.

use super::types::{
    RecommendationSet, SmartCombination, MOTOR_EFFICIENCY_COMBINATION,
};
use crate::record::{catalog, keys, EngineeringRecord, FieldValue};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Priority of suggestions drawn from the most-common list.
pub const PRIORITY_MOST_COMMON: u8 = 1;
/// Priority of suggestions drawn from the recent-values window.
pub const PRIORITY_RECENT: u8 = 2;

/// One entry in a text field's suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSuggestion {
    pub value: String,
    pub badge: String,
    /// Lower is shown first
    pub priority: u8,
}

/// Hint shown next to a numeric field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSuggestion {
    pub suggested: Option<f64>,
    pub average: Option<f64>,
    pub max: Option<f64>,
    pub tooltip: String,
}

/// Find a per-field entry, trying the persistence key before the raw key.
fn lookup<'a, T>(map: &'a BTreeMap<String, T>, field: &str) -> Option<&'a T> {
    catalog::field(field)
        .and_then(|spec| map.get(spec.api_key))
        .or_else(|| map.get(field))
}

/// True when `name` refers to `field` by either of its keys.
fn names_field(name: &str, field: &str) -> bool {
    name == field || catalog::field(field).is_some_and(|spec| spec.api_key == name)
}

/// Record key for a field named in a correlation table.
fn record_key(name: &str) -> &str {
    catalog::field_by_api_key(name).map_or(name, |spec| spec.key)
}

fn matches(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl SmartCombination {
    /// Target value for the first entry whose source value matches.
    pub fn lookup(&self, source_value: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|e| matches(&e.source_value, source_value))
            .map(|e| &e.target_value)
    }
}

impl RecommendationSet {
    /// Dropdown entries for a text field: most-common values first, then
    /// recent values not already listed, capped at `limit`.
    pub fn text_suggestions(&self, field: &str, limit: usize) -> Vec<TextSuggestion> {
        let Some(stats) = lookup(&self.text_fields, field) else {
            return Vec::new();
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();

        for vc in &stats.most_common {
            if out.len() >= limit {
                break;
            }
            if vc.value.trim().is_empty() || !seen.insert(vc.value.as_str()) {
                continue;
            }
            out.push(TextSuggestion {
                value: vc.value.clone(),
                badge: format!("Used {}×", vc.count),
                priority: PRIORITY_MOST_COMMON,
            });
        }

        for value in &stats.recent_values {
            if out.len() >= limit {
                break;
            }
            if value.trim().is_empty() || !seen.insert(value.as_str()) {
                continue;
            }
            out.push(TextSuggestion {
                value: value.clone(),
                badge: "Recent".to_string(),
                priority: PRIORITY_RECENT,
            });
        }

        out
    }

    /// Backend default and descriptive statistics for a numeric field.
    ///
    /// `None` when the backend reported nothing usable for the field.
    pub fn numeric_suggestion(&self, field: &str) -> Option<NumericSuggestion> {
        let stats = lookup(&self.numeric_fields, field)?;
        if stats.suggested_default.is_none() && stats.average.is_none() && stats.max.is_none() {
            return None;
        }

        let mut parts = Vec::new();
        if let Some(s) = stats.suggested_default {
            parts.push(format!("Suggested: {s:.2}"));
        }
        if let Some(a) = stats.average {
            parts.push(format!("Avg: {a:.2}"));
        }
        if let Some(m) = stats.max {
            parts.push(format!("Max: {m:.2}"));
        }
        parts.push(format!("Based on {} records", self.context.total_records_analyzed));

        Some(NumericSuggestion {
            suggested: stats.suggested_default,
            average: stats.average,
            max: stats.max,
            tooltip: parts.join(" | "),
        })
    }

    /// Typical motor efficiency for a motor classification.
    ///
    /// At most one suggestion: the first matching row wins.
    pub fn motor_efficiency_suggestion(&self, classification: &str) -> Option<f64> {
        if classification.trim().is_empty() {
            return None;
        }
        let table = self
            .smart_combinations
            .get(MOTOR_EFFICIENCY_COMBINATION)
            .or_else(|| {
                self.smart_combinations.values().find(|c| {
                    names_field(&c.source_field, keys::MOTOR_CLASSIFICATION)
                        && names_field(&c.target_field, keys::MOTOR_EFFICIENCY)
                })
            })?;
        match table.lookup(classification)? {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Null => None,
        }
    }

    /// Value a correlation table implies for `field` given the record.
    fn combination_value(&self, field: &str, record: &EngineeringRecord) -> Option<FieldValue> {
        self.smart_combinations
            .values()
            .filter(|c| names_field(&c.target_field, field))
            .find_map(|c| {
                let source = record.get(record_key(&c.source_field))?;
                if source.is_blank() {
                    return None;
                }
                c.lookup(&source.display()).cloned()
            })
            .filter(|v| !v.is_blank())
    }

    /// Resolve one suggestion for `field`: correlation table, then numeric
    /// default, then the most common text value.
    pub fn resolve(&self, field: &str, record: &EngineeringRecord) -> Option<FieldValue> {
        if let Some(v) = self.combination_value(field, record) {
            return Some(v);
        }
        if let Some(n) = lookup(&self.numeric_fields, field).and_then(|s| s.suggested_default) {
            return Some(FieldValue::Number(n));
        }
        lookup(&self.text_fields, field)
            .and_then(|s| s.most_common.iter().find(|vc| !vc.value.trim().is_empty()))
            .map(|vc| FieldValue::Text(vc.value.clone()))
    }

    /// Suggested values for the requested fields that are still empty.
    ///
    /// Fields holding a value and calculated fields are never included.
    pub fn auto_fill(&self, fields: &[&str], record: &EngineeringRecord) -> EngineeringRecord {
        let mut updates = EngineeringRecord::new();
        for &field in fields {
            if catalog::is_calculated(field) {
                debug!(field, "Auto-fill skips calculated field");
                continue;
            }
            if record.has_value(field) {
                continue;
            }
            if let Some(value) = self.resolve(field, record) {
                updates.set(field, value);
            }
        }
        debug!(requested = fields.len(), filled = updates.len(), "Auto-fill resolved");
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::types::{
        CombinationEntry, NumericFieldStats, SetContext, TextFieldStats, ValueCount,
    };

    fn sample_set() -> RecommendationSet {
        let mut set = RecommendationSet::empty();
        set.context = SetContext {
            total_records_analyzed: 12,
            ..Default::default()
        };
        set.text_fields.insert(
            "service".to_string(),
            TextFieldStats {
                most_common: vec![
                    ValueCount { value: "Crude Transfer".to_string(), count: 5 },
                    ValueCount { value: "Condensate".to_string(), count: 2 },
                ],
                recent_values: vec![
                    "Condensate".to_string(),
                    "Produced Water".to_string(),
                ],
            },
        );
        set.numeric_fields.insert(
            "pump_efficiency".to_string(),
            NumericFieldStats {
                suggested_default: Some(75.0),
                average: Some(72.5),
                max: Some(81.0),
                most_common: vec![],
            },
        );
        set.smart_combinations.insert(
            MOTOR_EFFICIENCY_COMBINATION.to_string(),
            SmartCombination {
                source_field: "motor_classification".to_string(),
                target_field: "motor_efficiency".to_string(),
                entries: vec![
                    CombinationEntry {
                        source_value: "IE3".to_string(),
                        target_value: FieldValue::Number(95.4),
                        count: 3,
                    },
                    CombinationEntry {
                        source_value: "ie3".to_string(),
                        target_value: FieldValue::Number(90.0),
                        count: 1,
                    },
                ],
            },
        );
        set
    }

    #[test]
    fn test_text_suggestions_rank_and_dedup() {
        let set = sample_set();
        let s = set.text_suggestions(keys::SERVICE, 10);
        let values: Vec<_> = s.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["Crude Transfer", "Condensate", "Produced Water"]);
        assert_eq!(s[0].badge, "Used 5×");
        assert_eq!(s[0].priority, PRIORITY_MOST_COMMON);
        assert_eq!(s[2].badge, "Recent");
        assert_eq!(s[2].priority, PRIORITY_RECENT);
    }

    #[test]
    fn test_text_suggestions_cap() {
        let mut set = RecommendationSet::empty();
        set.text_fields.insert(
            "client".to_string(),
            TextFieldStats {
                most_common: (0..8)
                    .map(|i| ValueCount { value: format!("C{i}"), count: 10 - i })
                    .collect(),
                recent_values: (0..8).map(|i| format!("R{i}")).collect(),
            },
        );
        let s = set.text_suggestions(keys::CLIENT, 10);
        assert_eq!(s.len(), 10);
        assert_eq!(s[9].value, "R1");
    }

    #[test]
    fn test_unknown_field_has_no_suggestions() {
        let set = sample_set();
        assert!(set.text_suggestions(keys::LOCATION, 10).is_empty());
        assert!(set.numeric_suggestion(keys::CV_MAX).is_none());
    }

    #[test]
    fn test_numeric_suggestion_tooltip() {
        let set = sample_set();
        let s = set.numeric_suggestion(keys::PUMP_EFFICIENCY).unwrap();
        assert_eq!(s.suggested, Some(75.0));
        assert_eq!(
            s.tooltip,
            "Suggested: 75.00 | Avg: 72.50 | Max: 81.00 | Based on 12 records"
        );
    }

    #[test]
    fn test_numeric_suggestion_without_statistics_is_none() {
        let mut set = RecommendationSet::empty();
        set.numeric_fields
            .insert("cv_max".to_string(), NumericFieldStats::default());
        assert!(set.numeric_suggestion(keys::CV_MAX).is_none());
    }

    #[test]
    fn test_motor_efficiency_first_match_wins() {
        let set = sample_set();
        assert_eq!(set.motor_efficiency_suggestion("IE3"), Some(95.4));
        assert_eq!(set.motor_efficiency_suggestion(" ie3 "), Some(95.4));
        assert_eq!(set.motor_efficiency_suggestion("IE4"), None);
        assert_eq!(set.motor_efficiency_suggestion(""), None);
    }

    #[test]
    fn test_auto_fill_never_overwrites() {
        let set = sample_set();
        let record = EngineeringRecord::new()
            .with(keys::REVISION, "3")
            .with(keys::SERVICE, "Lean Amine");
        let updates = set.auto_fill(&[keys::REVISION, keys::SERVICE], &record);
        assert!(updates.is_empty());
    }

    #[test]
    fn test_auto_fill_resolves_each_kind() {
        let set = sample_set();
        let record = EngineeringRecord::new()
            .with(keys::MOTOR_CLASSIFICATION, "IE3")
            .with(keys::SERVICE, "");
        let updates = set.auto_fill(
            &[keys::SERVICE, keys::PUMP_EFFICIENCY, keys::MOTOR_EFFICIENCY, keys::CLIENT],
            &record,
        );
        assert_eq!(updates.get(keys::SERVICE), Some(&FieldValue::from("Crude Transfer")));
        assert_eq!(updates.get(keys::PUMP_EFFICIENCY), Some(&FieldValue::Number(75.0)));
        assert_eq!(updates.get(keys::MOTOR_EFFICIENCY), Some(&FieldValue::Number(95.4)));
        assert!(updates.get(keys::CLIENT).is_none());
    }

    #[test]
    fn test_auto_fill_skips_calculated_fields() {
        let mut set = sample_set();
        set.numeric_fields.insert(
            "cv_ratio".to_string(),
            NumericFieldStats {
                suggested_default: Some(2.0),
                ..Default::default()
            },
        );
        let updates = set.auto_fill(&[keys::CV_RATIO], &EngineeringRecord::new());
        assert!(updates.is_empty());
    }
}
