//! ControlEvaluation: every assessment for one control
//!
//! Filters assessments by applicability, folds their results into a single
//! verdict and always finishes with `cleanup`, whether the loop completed,
//! halted on `Failed`, or was cancelled through a [`CancellationToken`].

use super::assessment::Assessment;
use super::interrupt::CancellationToken;
use super::procedure::Procedure;
use crate::config::{EvaluationConfig, RevertPolicy};
use crate::logging::codes;
use crate::types::Outcome;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::time::Instant;

/// How an `evaluate` call ended. Cleanup has run in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationOutcome {
    Completed,
    /// Cancellation was observed before every applicable assessment ran
    Interrupted,
}

impl EvaluationOutcome {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, EvaluationOutcome::Interrupted)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ControlEvaluation {
    pub name: String,
    pub control_id: String,
    #[serde(default)]
    pub result: Outcome,
    /// Message of the last assessment that ran
    #[serde(default)]
    pub message: String,
    /// Set when a change could not be reverted; never cleared
    #[serde(default)]
    pub corrupted_state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_guide: Option<String>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(skip)]
    pub revert_policy: RevertPolicy,
}

impl ControlEvaluation {
    pub fn new(name: impl Into<String>, control_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control_id: control_id.into(),
            ..Self::default()
        }
    }

    pub fn with_remediation_guide(mut self, guide: impl Into<String>) -> Self {
        self.remediation_guide = Some(guide.into());
        self
    }

    pub fn with_revert_policy(mut self, policy: RevertPolicy) -> Self {
        self.revert_policy = policy;
        self
    }

    /// Build and append an assessment.
    ///
    /// An incomplete definition is still appended (as `Unknown`), and its
    /// validation message is folded into this control's result and message.
    pub fn add_assessment(
        &mut self,
        requirement_id: impl Into<String>,
        description: impl Into<String>,
        applicability: Vec<String>,
        procedures: Vec<Procedure>,
    ) -> &mut Assessment {
        let assessment = match Assessment::new(requirement_id, description, applicability, procedures)
        {
            Ok(assessment) => assessment,
            Err(rejected) => {
                let (error, assessment) = rejected.into_parts();
                self.result = self.result.aggregate(Outcome::Unknown);
                self.message = error.to_string();
                assessment
            }
        };
        self.push_assessment(assessment)
    }

    /// Append an already built assessment
    pub fn push_assessment(&mut self, assessment: Assessment) -> &mut Assessment {
        let index = self.assessments.len();
        self.assessments.push(assessment);
        &mut self.assessments[index]
    }

    /// Evaluate without an external cancellation source
    pub fn evaluate(
        &mut self,
        target: &dyn Any,
        user_applicability: &[String],
        changes_allowed: bool,
    ) -> EvaluationOutcome {
        self.evaluate_until(
            target,
            user_applicability,
            changes_allowed,
            &CancellationToken::new(),
        )
    }

    /// Evaluate from a configuration, honouring its revert policy
    pub fn evaluate_with_config(
        &mut self,
        target: &dyn Any,
        config: &EvaluationConfig,
        token: &CancellationToken,
    ) -> EvaluationOutcome {
        self.revert_policy = config.revert_policy;
        self.evaluate_until(
            target,
            &config.applicability,
            config.changes_allowed,
            token,
        )
    }

    /// Run every applicable assessment in order until one fails or `token`
    /// is cancelled. The token is checked before each assessment and after
    /// every step; a running step is never cut short. Cleanup always runs
    /// before returning.
    pub fn evaluate_until(
        &mut self,
        target: &dyn Any,
        user_applicability: &[String],
        changes_allowed: bool,
        token: &CancellationToken,
    ) -> EvaluationOutcome {
        if self.assessments.is_empty() {
            self.result = Outcome::NeedsReview;
            log_warning!(codes::evaluation::NOT_EVALUABLE, "Control has no assessments",
                "control_id" => self.control_id
            );
            return EvaluationOutcome::Completed;
        }

        let start = Instant::now();
        log_success!(codes::success::EVALUATION_STARTED, "Control evaluation started",
            "control_id" => self.control_id,
            "assessments" => self.assessments.len(),
            "changes_allowed" => changes_allowed
        );

        let mut outcome = EvaluationOutcome::Completed;
        for assessment in self.assessments.iter_mut() {
            if token.is_cancelled() {
                outcome = EvaluationOutcome::Interrupted;
                break;
            }
            if !assessment.is_applicable(user_applicability) {
                log_debug!(codes::evaluation::ASSESSMENT_NOT_APPLICABLE, "Assessment not applicable",
                    "requirement_id" => assessment.requirement_id
                );
                continue;
            }

            let result = assessment.run_until(target, changes_allowed, token);
            self.result = self.result.aggregate(result);
            self.message = assessment.message.clone();

            if token.is_cancelled() {
                outcome = EvaluationOutcome::Interrupted;
                break;
            }

            if self.result.halts() {
                log_warning!(codes::evaluation::EXECUTION_HALTED, "Control evaluation halted",
                    "control_id" => self.control_id,
                    "requirement_id" => assessment.requirement_id
                );
                break;
            }
        }

        if outcome.is_interrupted() {
            log_error!(
                codes::evaluation::EVALUATION_INTERRUPTED,
                "Unexpected termination. Reverting changes made by the active evaluation; do not interrupt this process",
                "control_id" => self.control_id
            );
        }

        self.cleanup();

        log_success!(codes::success::EVALUATION_COMPLETED, "Control evaluation finished",
            "control_id" => self.control_id,
            "result" => self.result,
            "corrupted_state" => self.corrupted_state,
            "duration_ms" => start.elapsed().as_millis()
        );

        outcome
    }

    /// Revert every assessment's changes. Safe to call repeatedly.
    ///
    /// Returns the (sticky) corrupted state.
    pub fn cleanup(&mut self) -> bool {
        let policy = self.revert_policy;
        for assessment in self.assessments.iter_mut() {
            if assessment.revert_changes_with(policy) {
                self.corrupted_state = true;
            }
        }

        if self.corrupted_state {
            log_error!(codes::change::CORRUPTED_STATE, "Target left in a corrupted state",
                "control_id" => self.control_id
            );
        } else {
            log_success!(codes::success::CLEANUP_COMPLETED, "All changes reverted",
                "control_id" => self.control_id
            );
        }

        self.corrupted_state
    }

    /// Assessments that actually ran
    pub fn executed_assessments(&self) -> impl Iterator<Item = &Assessment> {
        self.assessments.iter().filter(|a| a.has_run())
    }
}
