//! # Result Generator
//!
//! Turns finished control evaluations into a report and its summary counts.

use super::types::{EvaluationReport, ReportSummary};
use crate::execution::{ControlEvaluation, EvaluationOutcome};
use crate::types::Outcome;

pub struct ResultGenerator;

impl ResultGenerator {
    /// Finalize `report` with the evaluated controls.
    ///
    /// `report` should be created before evaluation starts; its
    /// `started_at` is the start of the measured duration.
    pub fn build_report(
        mut report: EvaluationReport,
        controls: Vec<ControlEvaluation>,
        outcome: EvaluationOutcome,
    ) -> EvaluationReport {
        for control in controls {
            report.add_control(control);
        }
        if outcome.is_interrupted() {
            report.mark_interrupted();
        }
        report.finalize();
        report
    }

    /// Count controls per result and tally assessments
    pub fn summarize(controls: &[ControlEvaluation]) -> ReportSummary {
        let mut summary = ReportSummary::default();

        for control in controls {
            summary.total_controls += 1;

            match control.result {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::NeedsReview => summary.needs_review += 1,
                Outcome::Unknown => summary.unknown += 1,
                Outcome::NotRun => summary.not_run += 1,
            }

            if control.corrupted_state {
                summary.corrupted += 1;
            }

            summary.assessments_total += control.assessments.len() as u32;
            summary.assessments_executed += control.executed_assessments().count() as u32;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Step;
    use crate::results::HostContext;
    use crate::test_support::{
        assessment_of, failing_revert_change, needs_review_step, passing_step, procedure_of, tags,
    };
    use serde_json::Value;

    #[test]
    fn test_summarize_counts_results_and_corruption() {
        let mut reviewed = ControlEvaluation::new("Reviewed", "CTRL-1");
        reviewed.push_assessment(assessment_of(
            "A1",
            &["network"],
            vec![procedure_of(vec![needs_review_step("a1")])],
        ));
        reviewed.push_assessment(assessment_of(
            "A2",
            &["storage"],
            vec![procedure_of(vec![passing_step("a2")])],
        ));
        reviewed.evaluate(&(), &tags(&["network"]), false);

        let mut corrupted = ControlEvaluation::new("Corrupted", "CTRL-2");
        let assessment = corrupted.push_assessment(assessment_of(
            "A1",
            &["network"],
            vec![procedure_of(vec![Step::new("apply", |_payload, changes| {
                if let Some(change) = changes.get_mut("stuck") {
                    change.apply("disk", Value::Null, &Value::Null);
                }
                (Outcome::Passed, "applied".to_string())
            })])],
        ));
        assessment.changes.insert("stuck", failing_revert_change());
        corrupted.evaluate(&(), &tags(&["network"]), true);

        let empty = ControlEvaluation::new("Empty", "CTRL-3");

        let summary = ResultGenerator::summarize(&[reviewed, corrupted, empty]);
        assert_eq!(summary.total_controls, 3);
        assert_eq!(summary.needs_review, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.not_run, 1);
        assert_eq!(summary.corrupted, 1);
        assert_eq!(summary.assessments_total, 3);
        assert_eq!(summary.assessments_executed, 2);
        assert_eq!(summary.verdicts(), 3);
    }

    #[test]
    fn test_build_report_marks_interruption() {
        let report = ResultGenerator::build_report(
            EvaluationReport::new(HostContext::new("h", "os")),
            vec![ControlEvaluation::new("Empty", "CTRL-1")],
            EvaluationOutcome::Interrupted,
        );

        assert!(report.interrupted);
        assert!(report.is_finalized());
        assert_eq!(report.summary.total_controls, 1);
        assert!(report.requires_attention());
    }

    #[test]
    fn test_duration_covers_the_evaluation() {
        let report = EvaluationReport::new(HostContext::new("h", "os"));

        let mut slow = ControlEvaluation::new("Slow", "CTRL-1");
        slow.push_assessment(assessment_of(
            "A1",
            &["network"],
            vec![procedure_of(vec![Step::new("sleep", |_payload, _changes| {
                std::thread::sleep(std::time::Duration::from_millis(50));
                (Outcome::Passed, "slept".to_string())
            })])],
        ));
        slow.evaluate(&(), &tags(&["network"]), false);

        let report =
            ResultGenerator::build_report(report, vec![slow], EvaluationOutcome::Completed);
        assert!(report.timestamp.duration_ms >= 50);
        assert!(!report.interrupted);
    }
}
