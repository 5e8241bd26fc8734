//! Edit session - the single owner of a live engineering record
//!
//! Every edit goes through [`EditSession::apply_edit`], which refuses
//! calculated fields and recalculates before returning, so the record is
//! never observed half-updated. The session also scopes suggestion fetches:
//! closing it cancels whatever the recommendation engine still has in flight.

use crate::hydraulics::{self, RecalcReport};
use crate::record::{catalog, EngineeringRecord, FieldValue};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("'{label}' ({field}) is calculated and cannot be edited directly")]
    CalculatedField { field: String, label: &'static str },

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Outcome of one accepted edit
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub field: String,
    /// Derived fields rewritten by the edit, in evaluation order
    pub updated: Vec<&'static str>,
}

pub struct EditSession {
    record: EngineeringRecord,
    cancel: CancellationToken,
    edits: u64,
}

impl EditSession {
    /// Open a session on an existing record, as loaded.
    pub fn open(record: EngineeringRecord) -> Self {
        Self::with_cancellation(record, CancellationToken::new())
    }

    /// Open a session cancelled together with `parent`.
    pub fn with_cancellation(record: EngineeringRecord, parent: CancellationToken) -> Self {
        Self {
            record,
            cancel: parent.child_token(),
            edits: 0,
        }
    }

    pub fn record(&self) -> &EngineeringRecord {
        &self.record
    }

    pub fn into_record(mut self) -> EngineeringRecord {
        std::mem::take(&mut self.record)
    }

    /// Rerun every formula block, e.g. after loading a record saved by an
    /// older version of the formulas.
    pub fn recalculate_all(&mut self) {
        self.record = hydraulics::recalculate_all(&self.record);
    }

    /// Number of edits accepted so far
    pub fn edit_count(&self) -> u64 {
        self.edits
    }

    /// Token for work owned by this session, e.g. a recommendation engine
    /// built with `RecommendationEngine::with_cancellation`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn check_editable(field: &str) -> Result<(), EditError> {
        match catalog::field(field) {
            Some(spec) if spec.calculated => Err(EditError::CalculatedField {
                field: field.to_string(),
                label: spec.label,
            }),
            Some(_) => Ok(()),
            None => Err(EditError::UnknownField(field.to_string())),
        }
    }

    /// Set a user-editable field and recalculate its dependents.
    pub fn apply_edit(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<EditOutcome, EditError> {
        Self::check_editable(field)?;

        self.record.set(field, value);
        let RecalcReport {
            record, updated, ..
        } = hydraulics::recalculate_traced(&self.record, field);
        self.record = record;
        self.edits += 1;

        debug!(field, updated = updated.len(), "Edit applied");
        Ok(EditOutcome {
            field: field.to_string(),
            updated,
        })
    }

    /// Apply several edits in order. Stops at the first rejected field;
    /// edits before it stay applied.
    pub fn apply_edits<'a, I, V>(&mut self, edits: I) -> Result<Vec<EditOutcome>, EditError>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<FieldValue>,
    {
        edits
            .into_iter()
            .map(|(field, value)| self.apply_edit(field, value))
            .collect()
    }

    /// Merge auto-fill suggestions into fields that are still empty.
    ///
    /// Returns the fields actually filled. Calculated fields and fields
    /// that gained a value since the suggestions were computed are skipped.
    pub fn apply_autofill(&mut self, updates: EngineeringRecord) -> Vec<String> {
        let mut filled = Vec::new();
        for (field, value) in updates {
            if value.is_blank() || self.record.has_value(&field) {
                continue;
            }
            if Self::check_editable(&field).is_err() {
                continue;
            }
            if self.apply_edit(&field, value).is_ok() {
                filled.push(field);
            }
        }
        if !filled.is_empty() {
            info!(filled = filled.len(), "Auto-fill merged");
        }
        filled
    }

    /// Cancel outstanding work tied to this session.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
