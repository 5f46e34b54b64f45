//! # Evaluation Results Module
//!
//! Packages finished control evaluations into an [`EvaluationReport`] with a
//! report id, host context, timestamps and per-result counts, and handles its
//! JSON export and import.
//!
//! ## Usage
//! ```rust
//! use attest_engine::execution::{ControlEvaluation, EvaluationOutcome};
//! use attest_engine::results::{EvaluationReport, HostContext, ResultGenerator};
//!
//! // Open the report before evaluating so the duration covers the run
//! let report = EvaluationReport::new(HostContext::from_system());
//! let control = ControlEvaluation::new("Empty control", "CTRL-0");
//! let report = ResultGenerator::build_report(
//!     report,
//!     vec![control],
//!     EvaluationOutcome::Completed,
//! );
//! assert!(report.to_json().is_ok());
//! ```

pub mod error;
pub mod generator;
pub mod types;

pub use error::ResultGenerationError;
pub use generator::ResultGenerator;
pub use types::*;
