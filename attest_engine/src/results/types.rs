use super::error::ResultGenerationError;
use super::generator::ResultGenerator;
use crate::execution::ControlEvaluation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report covering one or more control evaluations in a single process run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Unique identifier for this report
    pub report_id: String,

    /// Host the evaluation ran on
    pub host: HostContext,

    pub timestamp: TimestampInfo,

    /// The run was cut short by a cancellation request
    #[serde(default)]
    pub interrupted: bool,

    pub summary: ReportSummary,

    pub controls: Vec<ControlEvaluation>,
}

/// Host execution context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostContext {
    pub hostname: String,

    /// Operating system and architecture
    pub os_info: String,
}

/// When the evaluation ran
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampInfo {
    pub started_at: DateTime<Utc>,

    /// Set by `finalize`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub duration_ms: u64,
}

/// Control counts per result, plus corrupted controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_controls: u32,
    pub passed: u32,
    pub failed: u32,
    pub needs_review: u32,
    pub unknown: u32,
    pub not_run: u32,
    /// Controls whose changes could not all be reverted
    pub corrupted: u32,
    pub assessments_executed: u32,
    pub assessments_total: u32,
}

impl EvaluationReport {
    pub fn new(host: HostContext) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            host,
            timestamp: TimestampInfo {
                started_at: Utc::now(),
                finished_at: None,
                duration_ms: 0,
            },
            interrupted: false,
            summary: ReportSummary::default(),
            controls: Vec::new(),
        }
    }

    pub fn add_control(&mut self, control: ControlEvaluation) {
        self.controls.push(control);
    }

    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// Stamp the finish time and compute the summary
    pub fn finalize(&mut self) {
        let finished_at = Utc::now();
        self.timestamp.duration_ms = (finished_at - self.timestamp.started_at)
            .num_milliseconds()
            .max(0) as u64;
        self.timestamp.finished_at = Some(finished_at);
        self.summary = ResultGenerator::summarize(&self.controls);
    }

    pub fn is_finalized(&self) -> bool {
        self.timestamp.finished_at.is_some()
    }

    /// Any control failed or left the target modified
    pub fn requires_attention(&self) -> bool {
        self.summary.failed > 0 || self.summary.corrupted > 0 || self.interrupted
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ResultGenerationError> {
        self.ensure_finalized()?;
        serde_json::to_string_pretty(self).map_err(|e| {
            ResultGenerationError::json_serialization_failed(
                &self.report_id,
                "json",
                &e.to_string(),
            )
        })
    }

    /// Serialize to compact JSON
    pub fn to_json_compact(&self) -> Result<String, ResultGenerationError> {
        self.ensure_finalized()?;
        serde_json::to_string(self).map_err(|e| {
            ResultGenerationError::json_serialization_failed(
                &self.report_id,
                "compact json",
                &e.to_string(),
            )
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ResultGenerationError> {
        serde_json::from_str(json).map_err(|e| {
            ResultGenerationError::json_deserialization_failed("EvaluationReport", &e.to_string())
        })
    }

    fn ensure_finalized(&self) -> Result<(), ResultGenerationError> {
        if self.is_finalized() {
            Ok(())
        } else {
            Err(ResultGenerationError::report_not_finalized(&self.report_id))
        }
    }
}

impl HostContext {
    /// Create host context from system information
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    pub fn new(hostname: impl Into<String>, os_info: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            os_info: os_info.into(),
        }
    }
}

impl ReportSummary {
    pub fn verdicts(&self) -> u32 {
        self.passed + self.failed + self.needs_review + self.unknown + self.not_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assessment_of, failing_step, passing_step, procedure_of, tags};
    use crate::types::Outcome;
    use assert_matches::assert_matches;

    fn evaluated(id: &str, passing: bool) -> ControlEvaluation {
        let step = if passing {
            passing_step("check")
        } else {
            failing_step("check")
        };
        let mut control = ControlEvaluation::new(format!("Control {}", id), id);
        control.push_assessment(assessment_of(
            "A1",
            &["network"],
            vec![procedure_of(vec![step])],
        ));
        control.evaluate(&(), &tags(&["network"]), false);
        control
    }

    #[test]
    fn test_report_json_round_trip() {
        let mut report = EvaluationReport::new(HostContext::new("host-a", "linux x86_64"));
        report.add_control(evaluated("CTRL-1", true));
        report.add_control(evaluated("CTRL-2", false));
        report.finalize();

        let json = report.to_json().unwrap();
        assert!(json.contains("\"control-id\": \"CTRL-1\""));

        let restored = EvaluationReport::from_json(&json).unwrap();
        assert_eq!(restored.report_id, report.report_id);
        assert_eq!(restored.host, report.host);
        assert_eq!(restored.summary, report.summary);
        assert_eq!(restored.controls[1].result, Outcome::Failed);
        assert!(restored.controls[0].assessments[0].procedures[0].steps[0]
            .name()
            .eq("check"));
    }

    #[test]
    fn test_export_requires_finalize() {
        let report = EvaluationReport::new(HostContext::from_system());
        assert_matches!(
            report.to_json(),
            Err(ResultGenerationError::ReportNotFinalized { .. })
        );
    }

    #[test]
    fn test_requires_attention() {
        let mut report = EvaluationReport::new(HostContext::new("h", "os"));
        report.add_control(evaluated("CTRL-1", true));
        report.finalize();
        assert!(!report.requires_attention());

        report.mark_interrupted();
        assert!(report.requires_attention());
    }

    #[test]
    fn test_from_invalid_json() {
        assert_matches!(
            EvaluationReport::from_json("{not json"),
            Err(ResultGenerationError::JsonDeserializationFailed { .. })
        );
    }

    #[test]
    fn test_report_ids_are_unique() {
        let a = EvaluationReport::new(HostContext::new("h", "os"));
        let b = EvaluationReport::new(HostContext::new("h", "os"));
        assert_ne!(a.report_id, b.report_id);
        assert!(!HostContext::from_system().hostname.is_empty());
    }
}
