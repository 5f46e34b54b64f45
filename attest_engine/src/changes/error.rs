use serde::{Deserialize, Serialize};

/// Reason a Change was poisoned or refused to run
///
/// Stored on the Change itself, so it has to survive serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeError {
    #[error("apply and revert functions must be defined for a change, but got apply: {apply}, revert: {revert}")]
    MissingFunctions { apply: bool, revert: bool },

    #[error("change must have a target name and description, but got target name: '{target_name}', description: '{description}'")]
    MissingFields {
        target_name: String,
        description: String,
    },

    #[error("change has a previous error and can no longer be used: {previous}")]
    Poisoned { previous: String },

    #[error("revert failed: {message}")]
    RevertFailed { message: String },
}

impl ChangeError {
    /// Precheck failures are refused before any user code runs
    pub fn is_precheck_failure(&self) -> bool {
        !matches!(self, ChangeError::RevertFailed { .. })
    }
}
