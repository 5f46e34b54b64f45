//! Shared fixtures for unit tests

use crate::changes::Change;
use crate::execution::{Assessment, Procedure, Step};
use crate::types::{Method, Outcome};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn passing_step(name: &str) -> Step {
    fixed_step(name, Outcome::Passed, "passed")
}

pub fn failing_step(name: &str) -> Step {
    fixed_step(name, Outcome::Failed, "failed")
}

pub fn needs_review_step(name: &str) -> Step {
    fixed_step(name, Outcome::NeedsReview, "needs review")
}

fn fixed_step(name: &str, outcome: Outcome, verb: &str) -> Step {
    let message = format!("{} {}", name, verb);
    Step::new(name, move |_payload, _changes| (outcome, message.clone()))
}

pub fn procedure_of(steps: Vec<Step>) -> Procedure {
    match Procedure::new("proc", "Fixture procedure", "", Method::Test, steps) {
        Ok(procedure) => procedure,
        Err(rejected) => rejected.into_inner(),
    }
}

pub fn assessment_of(id: &str, applicability: &[&str], procedures: Vec<Procedure>) -> Assessment {
    match Assessment::new(id, "Fixture assessment", tags(applicability), procedures) {
        Ok(assessment) => assessment,
        Err(rejected) => rejected.into_inner(),
    }
}

pub fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Default)]
pub struct ChangeCounters {
    pub applies: AtomicUsize,
    pub reverts: AtomicUsize,
}

/// Change whose functions always succeed and count their invocations.
/// Apply echoes its input.
pub fn counting_change() -> (Change, Arc<ChangeCounters>) {
    let counters = Arc::new(ChangeCounters::default());
    let applies = counters.clone();
    let reverts = counters.clone();
    let change = Change::new(
        "disk",
        "resize disk",
        Value::Null,
        move |input| {
            applies.applies.fetch_add(1, Ordering::SeqCst);
            Ok(input.clone())
        },
        move |_| {
            reverts.reverts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    );
    (change, counters)
}

pub fn failing_apply_change() -> Change {
    Change::new(
        "disk",
        "resize disk",
        Value::Null,
        |_| Err("disk busy".into()),
        |_| Ok(()),
    )
}

pub fn failing_revert_change() -> Change {
    Change::new(
        "disk",
        "resize disk",
        Value::Null,
        |_| Ok(Value::Null),
        |_| Err("revert refused".into()),
    )
}
