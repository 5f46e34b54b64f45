//! Human-readable report rendering and process exit codes

use attest_engine::{EvaluationReport, Outcome};

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_CORRUPTED: u8 = 3;
pub const EXIT_INTERRUPTED: u8 = 130;

/// Render a finalized report in a compiler-style summary
pub fn render_summary(report: &EvaluationReport) -> String {
    let mut output = String::new();

    for control in &report.controls {
        output.push_str(&format!(
            "Evaluating {} ({})...\n",
            control.name, control.control_id
        ));

        for assessment in &control.assessments {
            if !assessment.has_run() {
                continue;
            }
            output.push_str(&format!(
                "{}[{}]: {}\n",
                label(assessment.result),
                assessment.requirement_id,
                assessment.description
            ));
            if !assessment.message.is_empty() {
                output.push_str(&format!("  = {}\n", assessment.message));
            }
            let applied = assessment
                .changes
                .iter()
                .filter(|(_, change)| change.applied)
                .count();
            if applied > 0 {
                output.push_str(&format!("  = changes applied: {}\n", applied));
            }
        }

        output.push_str(&format!("  result: {}", control.result));
        if control.corrupted_state {
            output.push_str(" (corrupted state)");
        }
        output.push('\n');

        if control.result == Outcome::Failed || control.corrupted_state {
            if let Some(guide) = &control.remediation_guide {
                output.push_str(&format!("  help: {}\n", guide));
            }
        }
        output.push('\n');
    }

    let summary = &report.summary;
    output.push_str(&format!(
        "{} controls: {} passed, {} failed, {} needs review, {} unknown, {} not run\n",
        summary.total_controls,
        summary.passed,
        summary.failed,
        summary.needs_review,
        summary.unknown,
        summary.not_run
    ));
    output.push_str(&format!(
        "{}/{} assessments executed in {}ms\n",
        summary.assessments_executed, summary.assessments_total, report.timestamp.duration_ms
    ));
    if summary.corrupted > 0 {
        output.push_str(&format!(
            "error: {} controls left the target in a corrupted state\n",
            summary.corrupted
        ));
    }
    if report.interrupted {
        output.push_str("warning: evaluation was interrupted\n");
    }

    output
}

fn label(result: Outcome) -> &'static str {
    match result {
        Outcome::Passed => "ok",
        Outcome::Failed => "error",
        Outcome::NeedsReview => "review",
        Outcome::Unknown => "warning",
        Outcome::NotRun => "skipped",
    }
}

/// Exit status for a finished run; corruption wins over interruption, which wins over failure
pub fn exit_code(report: &EvaluationReport, cancelled: bool) -> u8 {
    if report.summary.corrupted > 0 {
        EXIT_CORRUPTED
    } else if report.interrupted || cancelled {
        EXIT_INTERRUPTED
    } else if report.summary.failed > 0 {
        EXIT_FAILED
    } else {
        EXIT_OK
    }
}
