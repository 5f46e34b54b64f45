//! Evaluation event codes and their classification metadata
//!
//! Single source of truth for every code the engine emits. Lookups for unknown
//! codes fall back to neutral defaults instead of failing.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code attached to every log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

/// How urgently an operator has to react to a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata registered for a code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    /// Target system may have been left modified; surface to the operator
    pub requires_attention: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl CodeMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        requires_attention: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            requires_attention,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_INVALID: Code = Code::new("ERR003");
}

/// Evaluation flow codes
pub mod evaluation {
    use super::Code;

    pub const INVALID_DEFINITION: Code = Code::new("E100");
    pub const EXECUTION_HALTED: Code = Code::new("E101");
    pub const EVALUATION_INTERRUPTED: Code = Code::new("E102");
    pub const MISSING_EXECUTOR: Code = Code::new("E103");
    pub const NOT_EVALUABLE: Code = Code::new("W100");
    pub const ASSESSMENT_NOT_APPLICABLE: Code = Code::new("D100");
    pub const STEP_COMPLETED: Code = Code::new("D101");
}

/// Change lifecycle codes
pub mod change {
    use super::Code;

    pub const APPLY_FAILED: Code = Code::new("W200");
    pub const NAME_CONFLICT: Code = Code::new("W201");
    pub const PRECHECK_FAILED: Code = Code::new("E200");
    pub const REVERT_FAILED: Code = Code::new("E201");
    pub const CORRUPTED_STATE: Code = Code::new("E202");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const EVALUATION_STARTED: Code = Code::new("I100");
    pub const EVALUATION_COMPLETED: Code = Code::new("I101");
    pub const ASSESSMENT_COMPLETED: Code = Code::new("I102");
    pub const CHANGE_APPLIED: Code = Code::new("I200");
    pub const CHANGE_REVERTED: Code = Code::new("I201");
    pub const CLEANUP_COMPLETED: Code = Code::new("I202");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| {
        let entries = [
            CodeMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                "Internal engine error",
                "Report the failure with the full log output",
            ),
            CodeMetadata::new(
                "ERR002",
                "System",
                Severity::High,
                false,
                "Logging or runtime initialization failed",
                "Check that initialization runs once per process",
            ),
            CodeMetadata::new(
                "ERR003",
                "System",
                Severity::High,
                false,
                "Evaluation configuration is invalid",
                "Fix the configuration file or ATTEST_* environment variables",
            ),
            CodeMetadata::new(
                "E100",
                "Evaluation",
                Severity::Medium,
                false,
                "Assessment or procedure definition is missing required fields",
                "Provide an id, description, applicability and at least one procedure or step",
            ),
            CodeMetadata::new(
                "E101",
                "Evaluation",
                Severity::Medium,
                false,
                "Execution halted after a failed result",
                "Review the failing assessment message",
            ),
            CodeMetadata::new(
                "E102",
                "Evaluation",
                Severity::High,
                true,
                "Evaluation interrupted; changes were reverted before returning",
                "Check corrupted-state before trusting the target",
            ),
            CodeMetadata::new(
                "E103",
                "Evaluation",
                Severity::Medium,
                false,
                "Step has a name but no executor",
                "Rebuild the procedure from code instead of a serialized record",
            ),
            CodeMetadata::new(
                "W100",
                "Evaluation",
                Severity::Low,
                false,
                "Control has no assessments and needs review",
                "Add assessments to the control",
            ),
            CodeMetadata::new(
                "D100",
                "Evaluation",
                Severity::Low,
                false,
                "Assessment skipped: applicability does not match",
                "No action required",
            ),
            CodeMetadata::new(
                "D101",
                "Evaluation",
                Severity::Low,
                false,
                "Step executed",
                "No action required",
            ),
            CodeMetadata::new(
                "W200",
                "Change",
                Severity::Medium,
                false,
                "Change apply function returned an error",
                "The change may be applied again by a later step",
            ),
            CodeMetadata::new(
                "W201",
                "Change",
                Severity::Medium,
                false,
                "Change name already holds a change that is in effect or poisoned",
                "Register the new change under a different name",
            ),
            CodeMetadata::new(
                "E200",
                "Change",
                Severity::High,
                true,
                "Change precheck failed; the change is poisoned",
                "Provide target name, description, apply and revert functions",
            ),
            CodeMetadata::new(
                "E201",
                "Change",
                Severity::Critical,
                true,
                "Change revert function returned an error",
                "Manually restore the target resource",
            ),
            CodeMetadata::new(
                "E202",
                "Change",
                Severity::Critical,
                true,
                "Target system left in a corrupted state",
                "Manually remediate every change that was not reverted",
            ),
            CodeMetadata::new(
                "I001",
                "System",
                Severity::Low,
                false,
                "Logging initialized",
                "No action required",
            ),
            CodeMetadata::new(
                "I100",
                "Evaluation",
                Severity::Low,
                false,
                "Control evaluation started",
                "No action required",
            ),
            CodeMetadata::new(
                "I101",
                "Evaluation",
                Severity::Low,
                false,
                "Control evaluation completed",
                "No action required",
            ),
            CodeMetadata::new(
                "I102",
                "Evaluation",
                Severity::Low,
                false,
                "Assessment completed",
                "No action required",
            ),
            CodeMetadata::new(
                "I200",
                "Change",
                Severity::Low,
                false,
                "Change applied",
                "No action required",
            ),
            CodeMetadata::new(
                "I201",
                "Change",
                Severity::Low,
                false,
                "Change reverted",
                "No action required",
            ),
            CodeMetadata::new(
                "I202",
                "Change",
                Severity::Low,
                false,
                "Cleanup finished without corruption",
                "No action required",
            ),
        ];

        entries.into_iter().map(|m| (m.code, m)).collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_code_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_code_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn requires_attention(code: &str) -> bool {
    get_code_metadata(code)
        .map(|metadata| metadata.requires_attention)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_code_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown code")
}

pub fn get_action(code: &str) -> &'static str {
    get_code_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_code_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
