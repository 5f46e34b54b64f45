//! Transactional change to a target resource
//!
//! A Change wraps an apply and a revert function. `applied` and `reverted` are
//! independent flags: `applied && !reverted` means the change is in effect. A
//! precheck failure or a failed revert stores an error and poisons the change
//! for good; a failed apply is transient.

use super::error::ChangeError;
use crate::logging::codes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Error type returned by user-supplied functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type ApplyFn = Arc<dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync>;
pub type RevertFn = Arc<dyn Fn(&Value) -> Result<(), BoxError> + Send + Sync>;

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Change {
    /// Name or id of the resource or configuration being changed
    pub target_name: String,
    pub description: String,

    #[serde(skip)]
    apply_fn: Option<ApplyFn>,
    #[serde(skip)]
    revert_fn: Option<RevertFn>,

    /// Supplemental data describing the changed object
    #[serde(default)]
    pub target_object: Value,
    /// Applied successfully at least once
    #[serde(default)]
    pub applied: bool,
    /// Reverted successfully and not applied again since
    #[serde(default)]
    pub reverted: bool,
    #[serde(default)]
    pub error: Option<ChangeError>,
    #[serde(default)]
    pub allowed: bool,
}

impl Change {
    pub fn new<A, R>(
        target_name: impl Into<String>,
        description: impl Into<String>,
        target_object: Value,
        apply: A,
        revert: R,
    ) -> Self
    where
        A: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
        R: Fn(&Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            target_name: target_name.into(),
            description: description.into(),
            apply_fn: Some(Arc::new(apply)),
            revert_fn: Some(Arc::new(revert)),
            target_object,
            ..Self::default()
        }
    }

    /// Permit `apply` to run. Only assessment orchestration may grant this.
    pub(crate) fn allow(&mut self) {
        self.allowed = true;
    }

    pub fn is_in_effect(&self) -> bool {
        self.applied && !self.reverted
    }

    pub fn is_poisoned(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_functions(&self) -> bool {
        self.apply_fn.is_some() && self.revert_fn.is_some()
    }

    /// Apply the change, returning whether it is in effect and the apply output.
    ///
    /// The output is only present when the apply function actually ran and
    /// succeeded on this call.
    pub fn apply(
        &mut self,
        target_name: &str,
        target_object: Value,
        change_input: &Value,
    ) -> (bool, Option<Value>) {
        if !self.allowed {
            return (false, None);
        }
        let apply_fn = match self.precheck() {
            Ok((apply_fn, _)) => apply_fn,
            Err(err) => {
                self.record_precheck_failure(err);
                return (false, None);
            }
        };
        if self.is_in_effect() {
            return (true, None);
        }

        self.target_name = target_name.to_string();
        self.target_object = target_object;

        match apply_fn(change_input) {
            Ok(output) => {
                self.applied = true;
                self.reverted = false;
                log_success!(codes::success::CHANGE_APPLIED, "Change applied",
                    "target" => self.target_name
                );
                (true, Some(output))
            }
            Err(err) => {
                log_warning!(codes::change::APPLY_FAILED, format!("Change apply failed: {}", err),
                    "target" => self.target_name
                );
                (false, None)
            }
        }
    }

    /// Undo an applied change. Never-applied or already-reverted changes are left alone.
    pub fn revert(&mut self, data: &Value) {
        if !self.applied || self.reverted {
            return;
        }
        let revert_fn = match self.precheck() {
            Ok((_, revert_fn)) => revert_fn,
            Err(err) => {
                self.record_precheck_failure(err);
                return;
            }
        };

        match revert_fn(data) {
            Ok(()) => {
                self.reverted = true;
                log_success!(codes::success::CHANGE_REVERTED, "Change reverted",
                    "target" => self.target_name
                );
            }
            Err(err) => {
                log_error!(codes::change::REVERT_FAILED, format!("Change revert failed: {}", err),
                    "target" => self.target_name
                );
                self.error = Some(ChangeError::RevertFailed {
                    message: err.to_string(),
                });
            }
        }
    }

    fn precheck(&self) -> Result<(ApplyFn, RevertFn), ChangeError> {
        let (apply_fn, revert_fn) = match (&self.apply_fn, &self.revert_fn) {
            (Some(apply_fn), Some(revert_fn)) => (apply_fn.clone(), revert_fn.clone()),
            (apply_fn, revert_fn) => {
                return Err(ChangeError::MissingFunctions {
                    apply: apply_fn.is_some(),
                    revert: revert_fn.is_some(),
                })
            }
        };
        if self.target_name.is_empty() || self.description.is_empty() {
            return Err(ChangeError::MissingFields {
                target_name: self.target_name.clone(),
                description: self.description.clone(),
            });
        }
        if let Some(previous) = &self.error {
            return Err(ChangeError::Poisoned {
                previous: previous.to_string(),
            });
        }
        Ok((apply_fn, revert_fn))
    }

    /// The first error sticks; later refusals are only logged
    fn record_precheck_failure(&mut self, err: ChangeError) {
        log_error!(codes::change::PRECHECK_FAILED, err.to_string(),
            "target" => self.target_name
        );
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("target_name", &self.target_name)
            .field("description", &self.description)
            .field("has_apply_fn", &self.apply_fn.is_some())
            .field("has_revert_fn", &self.revert_fn.is_some())
            .field("target_object", &self.target_object)
            .field("applied", &self.applied)
            .field("reverted", &self.reverted)
            .field("error", &self.error)
            .field("allowed", &self.allowed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{counting_change, failing_apply_change, failing_revert_change};
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_apply_requires_allowance() {
        let (mut change, counters) = counting_change();

        assert_eq!(change.apply("disk", Value::Null, &Value::Null), (false, None));
        assert!(!change.applied);
        assert_eq!(counters.applies.load(Ordering::SeqCst), 0);
        assert!(change.error.is_none());
    }

    #[test]
    fn test_apply_is_idempotent_while_in_effect() {
        let (mut change, counters) = counting_change();
        change.allow();

        let (applied, output) = change.apply("disk", json!({"size": 1}), &json!("input"));
        assert!(applied);
        assert_eq!(output, Some(json!("input")));
        assert_eq!(change.target_name, "disk");
        assert_eq!(change.target_object, json!({"size": 1}));

        assert_eq!(change.apply("disk", Value::Null, &Value::Null), (true, None));
        assert_eq!(counters.applies.load(Ordering::SeqCst), 1);
        assert!(change.is_in_effect());
    }

    #[test]
    fn test_reapply_after_revert() {
        let (mut change, counters) = counting_change();
        change.allow();

        change.apply("disk", Value::Null, &Value::Null);
        change.revert(&Value::Null);
        assert!(change.reverted);

        let (applied, _) = change.apply("disk", Value::Null, &Value::Null);
        assert!(applied);
        assert!(!change.reverted);
        assert_eq!(counters.applies.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_apply_is_transient() {
        let mut change = failing_apply_change();
        change.allow();

        assert_eq!(change.apply("disk", Value::Null, &Value::Null), (false, None));
        assert!(!change.applied);
        assert!(change.error.is_none());
        assert!(!change.is_poisoned());
    }

    #[test]
    fn test_precheck_poisons_without_running_user_code() {
        let mut change = Change {
            target_name: "disk".into(),
            description: "resize".into(),
            ..Change::default()
        };
        change.allow();

        assert_eq!(change.apply("disk", Value::Null, &Value::Null), (false, None));
        assert_matches!(
            change.error,
            Some(ChangeError::MissingFunctions {
                apply: false,
                revert: false
            })
        );
    }

    #[test]
    fn test_missing_fields_fail_precheck() {
        let (mut change, counters) = counting_change();
        change.description.clear();
        change.allow();

        change.apply("disk", Value::Null, &Value::Null);
        assert_matches!(change.error, Some(ChangeError::MissingFields { .. }));
        assert_eq!(counters.applies.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_revert_of_unapplied_change_is_noop() {
        let (mut change, counters) = counting_change();
        change.revert(&Value::Null);

        assert!(!change.reverted);
        assert!(change.error.is_none());
        assert_eq!(counters.reverts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_revert_twice_runs_once() {
        let (mut change, counters) = counting_change();
        change.allow();
        change.apply("disk", Value::Null, &Value::Null);

        change.revert(&Value::Null);
        change.revert(&Value::Null);
        assert!(change.reverted);
        assert_eq!(counters.reverts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_revert_poisons_permanently() {
        let mut change = failing_revert_change();
        change.allow();
        change.apply("disk", Value::Null, &Value::Null);

        change.revert(&Value::Null);
        assert!(change.applied);
        assert!(!change.reverted);
        let first_error = change.error.clone();
        assert_matches!(first_error, Some(ChangeError::RevertFailed { .. }));

        // Nothing moves once poisoned
        change.revert(&Value::Null);
        assert_eq!(change.apply("disk", Value::Null, &Value::Null), (false, None));
        assert!(change.applied);
        assert!(!change.reverted);
        assert_eq!(change.error, first_error);
    }

    #[test]
    fn test_serialization_skips_functions() {
        let (mut change, _) = counting_change();
        change.allow();
        change.apply("disk", json!({"id": 7}), &Value::Null);

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["target_name"], "disk");
        assert_eq!(json["target_object"]["id"], 7);
        assert_eq!(json["applied"], true);
        assert_eq!(json["allowed"], true);
        assert!(json.get("apply_fn").is_none());

        let restored: Change = serde_json::from_value(json).unwrap();
        assert!(!restored.has_functions());
        assert!(restored.is_in_effect());
    }
}
