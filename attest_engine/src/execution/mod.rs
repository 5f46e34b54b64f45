//! Execution hierarchy: ControlEvaluation → Assessment → Procedure → Step
//!
//! Results fold bottom-up with [`Outcome::aggregate`](crate::types::Outcome::aggregate)
//! and every level halts after the first `Failed` child.

pub mod assessment;
pub mod error;
pub mod evaluation;
pub mod interrupt;
pub mod procedure;
pub mod step;

pub use assessment::Assessment;
pub use error::{Rejected, ValidationError};
pub use evaluation::{ControlEvaluation, EvaluationOutcome};
pub use interrupt::CancellationToken;
pub use procedure::Procedure;
pub use step::{Step, StepFn};
