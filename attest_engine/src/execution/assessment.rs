//! Assessment: one control requirement, its procedures and its changes
//!
//! Orchestrates the change lifecycle around procedure execution: changes are
//! allowed only when the caller permits it, procedures run in order until one
//! fails, and `revert_changes` rolls back whatever was applied.

use super::error::{Rejected, ValidationError};
use super::interrupt::CancellationToken;
use super::procedure::Procedure;
use crate::changes::{BoxError, Change, ChangeSet};
use crate::config::RevertPolicy;
use crate::logging::codes;
use crate::types::Outcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Assessment {
    pub requirement_id: String,
    /// Tags deciding when this assessment is applicable
    pub applicability: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub result: Outcome,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    #[serde(default)]
    pub procedures_executed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_duration: Option<Duration>,
    #[serde(default)]
    pub changes: ChangeSet,
}

impl Assessment {
    /// Build an assessment. An incomplete definition is returned inside
    /// `Rejected` with `result = Unknown`; it will never run.
    pub fn new(
        requirement_id: impl Into<String>,
        description: impl Into<String>,
        applicability: Vec<String>,
        procedures: Vec<Procedure>,
    ) -> Result<Self, Rejected<Self>> {
        let mut assessment = Self {
            requirement_id: requirement_id.into(),
            description: description.into(),
            applicability,
            procedures,
            ..Self::default()
        };

        match assessment.precheck() {
            Ok(()) => Ok(assessment),
            Err(error) => {
                assessment.mark_invalid(&error);
                Err(Rejected::new(error, assessment))
            }
        }
    }

    /// Queue another procedure
    pub fn add_procedure(&mut self, procedure: Procedure) {
        self.procedures.push(procedure);
    }

    /// Register a change owned by this assessment
    pub fn new_change<A, R>(
        &mut self,
        change_name: impl Into<String>,
        target_name: impl Into<String>,
        description: impl Into<String>,
        target_object: Value,
        apply: A,
        revert: R,
    ) -> &mut Change
    where
        A: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
        R: Fn(&Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.changes.register(
            change_name,
            target_name,
            description,
            target_object,
            apply,
            revert,
        )
    }

    /// Any-match against the caller's tags
    pub fn is_applicable(&self, user_applicability: &[String]) -> bool {
        self.applicability
            .iter()
            .any(|tag| user_applicability.contains(tag))
    }

    pub fn has_run(&self) -> bool {
        self.result != Outcome::NotRun
    }

    /// Run every procedure in order, halting after the first `Failed` one.
    ///
    /// An assessment with a result other than `NotRun` is never re-executed.
    pub fn run(&mut self, target: &dyn Any, changes_allowed: bool) -> Outcome {
        self.run_until(target, changes_allowed, &CancellationToken::new())
    }

    /// As `run`, but stops after the current step once `token` is cancelled
    /// and starts no further procedure
    pub fn run_until(
        &mut self,
        target: &dyn Any,
        changes_allowed: bool,
        token: &CancellationToken,
    ) -> Outcome {
        if self.has_run() {
            return self.result;
        }

        let start = Instant::now();
        if let Err(error) = self.precheck() {
            self.mark_invalid(&error);
            return self.result;
        }

        if changes_allowed {
            self.changes.allow_all();
        }

        for procedure in self.procedures.iter_mut() {
            if token.is_cancelled() {
                break;
            }
            self.procedures_executed += 1;
            let outcome = procedure.run_procedure_until(target, &mut self.changes, token);
            self.result = self.result.aggregate(outcome);
            self.message = procedure.message.clone();

            if outcome.halts() {
                log_warning!(codes::evaluation::EXECUTION_HALTED, "Assessment halted on failed procedure",
                    "requirement_id" => self.requirement_id,
                    "procedure" => procedure.id
                );
                break;
            }
        }

        let elapsed = start.elapsed();
        self.run_duration = Some(elapsed);

        log_success!(codes::success::ASSESSMENT_COMPLETED, "Assessment completed",
            "requirement_id" => self.requirement_id,
            "result" => self.result,
            "duration_ms" => elapsed.as_millis()
        );

        self.result
    }

    /// Revert every applied change, reporting whether any was left corrupted
    pub fn revert_changes(&mut self) -> bool {
        self.revert_changes_with(RevertPolicy::RevertAll)
    }

    /// Candidates are changes that were ever applied or already carry an
    /// error. A candidate is corrupted when it ends with an error or unreverted.
    pub fn revert_changes_with(&mut self, policy: RevertPolicy) -> bool {
        let mut corrupted = false;

        for (name, change) in self.changes.iter_mut() {
            if corrupted && policy == RevertPolicy::StopOnCorruption {
                break;
            }
            if !change.applied && change.error.is_none() {
                continue;
            }
            if !change.reverted {
                change.revert(&Value::Null);
            }
            if change.error.is_some() || !change.reverted {
                corrupted = true;
                log_error!(codes::change::CORRUPTED_STATE, "Change left in effect",
                    "requirement_id" => self.requirement_id,
                    "change" => name,
                    "target" => change.target_name
                );
            }
        }

        corrupted
    }

    pub fn precheck(&self) -> Result<(), ValidationError> {
        if self.requirement_id.is_empty()
            || self.description.is_empty()
            || self.applicability.is_empty()
            || self.procedures.is_empty()
        {
            return Err(ValidationError::IncompleteAssessment {
                requirement_id: self.requirement_id.len(),
                description: self.description.len(),
                applicability: self.applicability.len(),
                procedures: self.procedures.len(),
            });
        }
        Ok(())
    }

    fn mark_invalid(&mut self, error: &ValidationError) {
        log_error!(codes::evaluation::INVALID_DEFINITION, error.to_string(),
            "requirement_id" => self.requirement_id
        );
        self.result = Outcome::Unknown;
        self.message = error.to_string();
    }
}
