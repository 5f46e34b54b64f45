//! Built-in controls shipped with the CLI

pub mod filesystem;

pub use filesystem::{filesystem_hygiene_control, FsTarget};

use attest_engine::ControlEvaluation;

/// Applicability used when neither the config nor the command line names any
pub const DEFAULT_APPLICABILITY: [&str; 2] = ["filesystem", "permissions"];

/// Every control the CLI evaluates, in order
pub fn builtin_controls() -> Vec<ControlEvaluation> {
    vec![filesystem_hygiene_control()]
}

pub fn default_applicability() -> Vec<String> {
    DEFAULT_APPLICABILITY.iter().map(|tag| tag.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_controls_are_unique() {
        let controls = builtin_controls();
        let mut ids: Vec<&str> = controls.iter().map(|c| c.control_id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), controls.len());
    }

    #[test]
    fn test_default_applicability_matches_a_builtin_assessment() {
        let tags = default_applicability();
        let controls = builtin_controls();
        assert!(controls
            .iter()
            .flat_map(|c| c.assessments.iter())
            .any(|a| a.is_applicable(&tags)));
    }
}
