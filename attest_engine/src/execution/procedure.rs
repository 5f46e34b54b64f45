//! Procedure: ordered steps sharing one evaluation method

use super::error::{Rejected, ValidationError};
use super::interrupt::CancellationToken;
use super::step::Step;
use crate::changes::ChangeSet;
use crate::logging::codes;
use crate::types::{Method, Outcome};
use serde::{Deserialize, Serialize};
use std::any::Any;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Procedure {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub method: Method,
    /// Remediation guidance for this procedure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_guide: Option<String>,
    /// Where the procedure's approach is documented
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Set once `run_procedure` has been called; `result` is then meaningful
    #[serde(default)]
    pub run: bool,
    /// Message of the most recently executed step
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Outcome,
    #[serde(default)]
    pub steps_executed: usize,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Procedure {
    /// Build a procedure. Without an id or steps the procedure is returned
    /// inside `Rejected` with `result = Unknown`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        method: Method,
        steps: Vec<Step>,
    ) -> Result<Self, Rejected<Self>> {
        let mut procedure = Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            method,
            steps,
            ..Self::default()
        };

        if procedure.id.is_empty() || procedure.steps.is_empty() {
            let error = ValidationError::IncompleteProcedure {
                id: procedure.id.len(),
                steps: procedure.steps.len(),
            };
            procedure.result = Outcome::Unknown;
            procedure.message = error.to_string();
            return Err(Rejected::new(error, procedure));
        }

        Ok(procedure)
    }

    pub fn with_remediation_guide(mut self, guide: impl Into<String>) -> Self {
        self.remediation_guide = Some(guide.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Queue another step
    pub fn add_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Run every step in order, stopping after the first `Failed` step.
    ///
    /// A procedure runs at most once; later calls return the cached result.
    pub fn run_procedure(&mut self, payload: &dyn Any, changes: &mut ChangeSet) -> Outcome {
        self.run_procedure_until(payload, changes, &CancellationToken::new())
    }

    /// As `run_procedure`, but no further step starts once `token` is cancelled
    pub fn run_procedure_until(
        &mut self,
        payload: &dyn Any,
        changes: &mut ChangeSet,
        token: &CancellationToken,
    ) -> Outcome {
        if self.run {
            return self.result;
        }
        self.run = true;

        if self.steps.is_empty() {
            let error = ValidationError::IncompleteProcedure {
                id: self.id.len(),
                steps: 0,
            };
            self.result = Outcome::Unknown;
            self.message = error.to_string();
            return self.result;
        }

        // A validation mark from construction does not count as a step result
        self.result = Outcome::NotRun;

        for step in &self.steps {
            self.steps_executed += 1;
            let (outcome, message) = step.execute(payload, changes);
            self.result = self.result.aggregate(outcome);
            self.message = message;

            log_debug!(codes::evaluation::STEP_COMPLETED, "Step completed",
                "procedure" => self.id,
                "step" => step.name(),
                "result" => outcome
            );

            if outcome.halts() {
                log_warning!(codes::evaluation::EXECUTION_HALTED, "Procedure halted on failed step",
                    "procedure" => self.id,
                    "step" => step.name()
                );
                break;
            }
            if token.is_cancelled() {
                log_debug!(codes::evaluation::EVALUATION_INTERRUPTED, "Procedure stopped after cancellation",
                    "procedure" => self.id,
                    "steps_executed" => self.steps_executed
                );
                break;
            }
        }

        self.result
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }
}
