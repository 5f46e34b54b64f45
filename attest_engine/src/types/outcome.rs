//! Outcome of a step, procedure, assessment or control evaluation
//!
//! Every level of the execution hierarchy folds its children's outcomes with
//! [`Outcome::aggregate`]. The fold is a max over an explicit severity table,
//! and [`Outcome::Failed`] is the only value that stops iteration.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Closed set of evaluation outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// Nothing has been executed yet
    #[default]
    #[serde(rename = "Not Run")]
    NotRun,
    #[serde(rename = "Passed")]
    Passed,
    #[serde(rename = "Failed")]
    Failed,
    /// A human must look at the evidence before a verdict is possible
    #[serde(rename = "Needs Review")]
    NeedsReview,
    /// The check could not determine an outcome (also used for invalid definitions)
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Outcome {
    /// All outcomes from weakest to strongest
    pub const SEVERITY_ORDER: [Outcome; 5] = [
        Outcome::NotRun,
        Outcome::Passed,
        Outcome::Unknown,
        Outcome::NeedsReview,
        Outcome::Failed,
    ];

    /// Aggregation rank; higher wins
    pub fn severity(self) -> u8 {
        match self {
            Outcome::NotRun => 0,
            Outcome::Passed => 1,
            Outcome::Unknown => 2,
            Outcome::NeedsReview => 3,
            Outcome::Failed => 4,
        }
    }

    /// Combine a running aggregate with a newly observed outcome
    pub fn aggregate(self, next: Outcome) -> Outcome {
        if next.severity() > self.severity() {
            next
        } else {
            self
        }
    }

    /// Whether iteration at this level (and every enclosing level) must stop
    pub fn halts(self) -> bool {
        self == Outcome::Failed
    }

    /// Fold outcomes in order, stopping after the first `Failed`.
    ///
    /// Returns the aggregate and the number of items consumed.
    pub fn fold_until_failed<I>(outcomes: I) -> (Outcome, usize)
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut aggregate = Outcome::NotRun;
        let mut consumed = 0;
        for outcome in outcomes {
            consumed += 1;
            aggregate = aggregate.aggregate(outcome);
            if outcome.halts() {
                break;
            }
        }
        (aggregate, consumed)
    }

    /// Display name, also the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NotRun => "Not Run",
            Outcome::Passed => "Passed",
            Outcome::Failed => "Failed",
            Outcome::NeedsReview => "Needs Review",
            Outcome::Unknown => "Unknown",
        }
    }
}

impl PartialOrd for Outcome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Outcome {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::SEVERITY_ORDER
            .iter()
            .copied()
            .find(|outcome| outcome.as_str() == s)
            .ok_or_else(|| format!("unrecognized result '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_table_is_pinned() {
        let ranks: Vec<u8> = Outcome::SEVERITY_ORDER
            .iter()
            .map(|o| o.severity())
            .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);

        assert!(Outcome::Failed > Outcome::NeedsReview);
        assert!(Outcome::NeedsReview > Outcome::Unknown);
        assert!(Outcome::Unknown > Outcome::Passed);
        assert!(Outcome::Passed > Outcome::NotRun);
    }

    #[test]
    fn test_aggregate_from_not_run_takes_next() {
        for outcome in Outcome::SEVERITY_ORDER {
            assert_eq!(Outcome::NotRun.aggregate(outcome), outcome);
        }
    }

    #[test]
    fn test_aggregate_never_downgrades() {
        assert_eq!(
            Outcome::NeedsReview.aggregate(Outcome::Passed),
            Outcome::NeedsReview
        );
        assert_eq!(
            Outcome::Unknown.aggregate(Outcome::Passed),
            Outcome::Unknown
        );
        assert_eq!(
            Outcome::NeedsReview.aggregate(Outcome::Unknown),
            Outcome::NeedsReview
        );
        assert_eq!(Outcome::Failed.aggregate(Outcome::Passed), Outcome::Failed);
        assert_eq!(Outcome::Passed.aggregate(Outcome::NotRun), Outcome::Passed);
    }

    #[test]
    fn test_fold_is_strongest_item() {
        let (aggregate, consumed) = Outcome::fold_until_failed([
            Outcome::Passed,
            Outcome::Unknown,
            Outcome::NeedsReview,
            Outcome::Passed,
        ]);
        assert_eq!(aggregate, Outcome::NeedsReview);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_fold_halts_at_first_failed() {
        let (aggregate, consumed) = Outcome::fold_until_failed([
            Outcome::Passed,
            Outcome::Failed,
            Outcome::NeedsReview,
        ]);
        assert_eq!(aggregate, Outcome::Failed);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_fold_of_nothing_is_not_run() {
        assert_eq!(
            Outcome::fold_until_failed(Vec::<Outcome>::new()),
            (Outcome::NotRun, 0)
        );
    }

    #[test]
    fn test_only_failed_halts() {
        for outcome in Outcome::SEVERITY_ORDER {
            assert_eq!(outcome.halts(), outcome == Outcome::Failed);
        }
    }

    #[test]
    fn test_serializes_as_display_string() {
        assert_eq!(
            serde_json::to_string(&Outcome::NeedsReview).unwrap(),
            "\"Needs Review\""
        );
        assert_eq!(
            serde_json::to_string(&Outcome::NotRun).unwrap(),
            "\"Not Run\""
        );
        let parsed: Outcome = serde_json::from_str("\"Failed\"").unwrap();
        assert_eq!(parsed, Outcome::Failed);
    }

    #[test]
    fn test_from_str_matches_display() {
        for outcome in Outcome::SEVERITY_ORDER {
            assert_eq!(outcome.to_string().parse::<Outcome>(), Ok(outcome));
        }
        assert!("passed".parse::<Outcome>().is_err());
    }
}
