use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a procedure's outcome was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Method {
    #[default]
    Unknown,
    /// Automated test against the target
    Test,
    /// Inspection performed and attested by a human
    Observation,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Unknown => "Unknown",
            Method::Test => "Test",
            Method::Observation => "Observation",
        }
    }

    /// Check if the method runs without a human in the loop
    pub fn is_automated(&self) -> bool {
        matches!(self, Method::Test)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(Method::Unknown),
            "Test" => Ok(Method::Test),
            "Observation" => Ok(Method::Observation),
            _ => Err(format!("unrecognized method '{}'", s)),
        }
    }
}
