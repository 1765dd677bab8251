//! Batch actions over a selection.
//!
//! The library never persists anything itself: each action is forwarded,
//! one identity at a time, to a caller-supplied [`RecordActions`] backend.
//! Batches are not atomic. A failure on one record is recorded in the
//! [`BatchReport`] and processing continues with the next identity; records
//! already changed stay changed.

use crate::error::ActionError;
use crate::selection::SelectionSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bulk operation applied to every selected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchAction {
    /// Set a new password on every selected account.
    ResetPassword { password: String },
    /// Activate (`true`) or deactivate (`false`) every selected record.
    SetActive(bool),
    Delete,
}

impl BatchAction {
    /// Destructive actions change or remove the selected records, so the
    /// selection is cleared once they complete.
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self, Self::SetActive(_) | Self::Delete)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ResetPassword { .. } => "reset-password",
            Self::SetActive(true) => "activate",
            Self::SetActive(false) => "deactivate",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Persistence callbacks for batch actions.
pub trait RecordActions {
    /// Remove a record.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] when the record is missing or the backend
    /// refuses the removal.
    fn delete(&mut self, id: &str) -> Result<(), ActionError>;

    /// Change a record's active flag.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] when the record is missing or the backend
    /// refuses the change.
    fn set_active(&mut self, id: &str, active: bool) -> Result<(), ActionError>;

    /// Replace an account's password.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] when the record is missing or has no
    /// account to update.
    fn reset_password(&mut self, id: &str, password: &str) -> Result<(), ActionError>;
}

/// One record the backend refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub id: String,
    pub message: String,
}

/// Outcome of one [`run_batch`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub action: String,
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// A single user-facing message describing the failures, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self.failed.as_slice() {
            [] => None,
            [only] => Some(format!("{} failed for {}: {}", self.action, only.id, only.message)),
            [first, ..] => Some(format!(
                "{} failed for {} of {} records (first: {}: {})",
                self.action,
                self.failed.len(),
                self.attempted(),
                first.id,
                first.message
            )),
        }
    }

    /// One-line summary, e.g. `delete: 3 succeeded, 1 failed`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} succeeded, {} failed",
            self.action,
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

/// Apply `action` to every selected identity in order.
///
/// Never stops early. The selection itself is left untouched; clearing it
/// after destructive actions is the caller's job (see
/// [`CollectionView::run_batch`](crate::view::CollectionView::run_batch)).
pub fn run_batch(
    selection: &SelectionSet,
    action: &BatchAction,
    backend: &mut dyn RecordActions,
) -> BatchReport {
    let mut report = BatchReport {
        action: action.name().to_string(),
        succeeded: Vec::with_capacity(selection.len()),
        failed: Vec::new(),
    };

    for id in selection.iter() {
        let result = match action {
            BatchAction::ResetPassword { password } => backend.reset_password(id, password),
            BatchAction::SetActive(active) => backend.set_active(id, *active),
            BatchAction::Delete => backend.delete(id),
        };
        match result {
            Ok(()) => report.succeeded.push(id.to_string()),
            Err(e) => {
                tracing::warn!(id, action = %action, error = %e, "batch item failed");
                report.failed.push(BatchFailure {
                    id: id.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        action = %action,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "batch action complete"
    );
    report
}
