// RUNTIME PREFERENCES

use super::ConfigError;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How `Assessment::revert_changes` treats candidates after the first corrupted one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevertPolicy {
    /// Attempt every candidate and report corruption if any failed
    #[default]
    RevertAll,
    /// Leave the remaining candidates untouched once one is corrupted
    StopOnCorruption,
}

impl RevertPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevertPolicy::RevertAll => "revert-all",
            RevertPolicy::StopOnCorruption => "stop-on-corruption",
        }
    }
}

impl fmt::Display for RevertPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevertPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "revert-all" => Ok(RevertPolicy::RevertAll),
            "stop-on-corruption" => Ok(RevertPolicy::StopOnCorruption),
            other => Err(ConfigError::invalid(
                "revert_policy",
                format!(
                    "expected 'revert-all' or 'stop-on-corruption', got '{}'",
                    other
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Events less severe than this are dropped
    pub min_log_level: LogLevel,

    /// Emit JSON lines instead of human-readable output
    pub use_structured_logging: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            min_log_level: env::var("ATTEST_LOG_LEVEL")
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Info),
            use_structured_logging: env::var("ATTEST_STRUCTURED_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

/// Everything a host needs to drive one control evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Whether assessments may apply their changes
    pub changes_allowed: bool,

    /// Caller applicability tags; an assessment runs if any of its tags is listed
    pub applicability: Vec<String>,

    pub revert_policy: RevertPolicy,

    pub logging: LoggingPreferences,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            changes_allowed: env::var("ATTEST_CHANGES_ALLOWED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            applicability: env::var("ATTEST_APPLICABILITY")
                .ok()
                .map(|v| parse_applicability(&v))
                .unwrap_or_default(),
            revert_policy: env::var("ATTEST_REVERT_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            logging: LoggingPreferences::default(),
        }
    }
}

impl EvaluationConfig {
    /// Parse TOML; missing keys keep their environment-derived defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EvaluationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(position) = self
            .applicability
            .iter()
            .position(|tag| tag.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "applicability",
                format!("tag at position {} is empty", position),
            ));
        }
        Ok(())
    }

    pub fn with_changes_allowed(mut self, allowed: bool) -> Self {
        self.changes_allowed = allowed;
        self
    }

    pub fn with_applicability<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicability = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_revert_policy(mut self, policy: RevertPolicy) -> Self {
        self.revert_policy = policy;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.logging.min_log_level = level;
        self
    }

    pub fn with_structured_logging(mut self, structured: bool) -> Self {
        self.logging.use_structured_logging = structured;
        self
    }
}

/// Split a comma-separated tag list, dropping blanks
pub fn parse_applicability(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}
