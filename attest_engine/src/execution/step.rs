//! Step: a named, caller-supplied check function
//!
//! Steps serialize as their name only. A step restored from a report keeps the
//! name but has no executor; running it yields `Unknown`.

use crate::changes::ChangeSet;
use crate::logging::codes;
use crate::types::Outcome;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// `(payload, live changes) -> (outcome, message)`
pub type StepFn = Arc<dyn Fn(&dyn Any, &mut ChangeSet) -> (Outcome, String) + Send + Sync>;

#[derive(Clone)]
pub struct Step {
    name: String,
    executor: Option<StepFn>,
}

impl Step {
    pub fn new<F>(name: impl Into<String>, executor: F) -> Self
    where
        F: Fn(&dyn Any, &mut ChangeSet) -> (Outcome, String) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            executor: Some(Arc::new(executor)),
        }
    }

    /// Name without executor
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executor: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    pub fn execute(&self, payload: &dyn Any, changes: &mut ChangeSet) -> (Outcome, String) {
        match &self.executor {
            Some(executor) => executor(payload, changes),
            None => {
                let message = format!("step '{}' has no executor", self.name);
                log_error!(codes::evaluation::MISSING_EXECUTOR, message, "step" => self.name);
                (Outcome::Unknown, message)
            }
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("has_executor", &self.has_executor())
            .finish()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Step::unbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::passing_step;

    #[test]
    fn test_execute_passes_payload() {
        let step = Step::new("payload-is-42", |payload, _changes| {
            match payload.downcast_ref::<u32>() {
                Some(&42) => (Outcome::Passed, "payload ok".to_string()),
                _ => (Outcome::Failed, "unexpected payload".to_string()),
            }
        });
        let mut changes = ChangeSet::new();

        assert_eq!(
            step.execute(&42u32, &mut changes),
            (Outcome::Passed, "payload ok".to_string())
        );
        assert_eq!(step.execute(&"x", &mut changes).0, Outcome::Failed);
    }

    #[test]
    fn test_step_can_register_change() {
        let step = Step::new("register", |_payload, changes| {
            changes.register(
                "probe",
                "probe-target",
                "probe change",
                serde_json::Value::Null,
                |_| Ok(serde_json::Value::Null),
                |_| Ok(()),
            );
            (Outcome::Passed, "registered".to_string())
        });
        let mut changes = ChangeSet::new();
        step.execute(&(), &mut changes);
        assert!(changes.contains("probe"));
    }

    #[test]
    fn test_serializes_as_name() {
        let step = passing_step("check-a");
        assert_eq!(serde_json::to_string(&step).unwrap(), "\"check-a\"");

        let restored: Step = serde_json::from_str("\"check-a\"").unwrap();
        assert_eq!(restored.name(), "check-a");
        assert!(!restored.has_executor());
    }

    #[test]
    fn test_unbound_step_is_unknown() {
        let mut changes = ChangeSet::new();
        let (outcome, message) = Step::unbound("restored").execute(&(), &mut changes);
        assert_eq!(outcome, Outcome::Unknown);
        assert_eq!(message, "step 'restored' has no executor");
    }
}
