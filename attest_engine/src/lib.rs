//! Control evaluation engine
//!
//! Runs the assessments of a control against a target, folds their outcomes
//! into one verdict, and applies and reverts the side-effecting changes used
//! while testing. Cleanup runs on normal completion and on cancellation, and a
//! sticky corrupted-state flag reports changes that could not be undone.

// Internal modules
#[macro_use]
pub mod logging;
pub mod changes;
pub mod config;
pub mod execution;
pub mod results;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export key types for library consumers
pub use changes::{BoxError, Change, ChangeError, ChangeSet};
pub use config::{ConfigError, EvaluationConfig, LoggingPreferences, RevertPolicy};
pub use execution::{
    Assessment, CancellationToken, ControlEvaluation, EvaluationOutcome, Procedure, Rejected,
    Step, ValidationError,
};
pub use results::{EvaluationReport, HostContext, ResultGenerationError, ResultGenerator};
pub use types::{Method, Outcome};
