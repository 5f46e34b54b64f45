//! # Filesystem Hygiene Control
//!
//! Built-in control evaluated against a directory:
//! - `FS-01` the target is a directory the evaluation can write to (probe change)
//! - `FS-02` nothing under the target is world-writable
//! - `FS-03` backup retention, attested by an operator

use attest_engine::{
    Assessment, BoxError, ChangeSet, ControlEvaluation, Method, Outcome, Procedure, Step,
};
use serde_json::{json, Value};
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const CONTROL_ID: &str = "filesystem-hygiene";
pub const PROBE_CHANGE: &str = "write-probe";

/// World-writable paths listed in a failure message before truncating
const MAX_REPORTED_PATHS: usize = 5;

/// Payload handed to every filesystem step
#[derive(Debug, Clone)]
pub struct FsTarget {
    pub root: PathBuf,
}

impl FsTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn probe_path(&self) -> PathBuf {
        self.root
            .join(format!(".attest-probe-{}", std::process::id()))
    }
}

pub fn filesystem_hygiene_control() -> ControlEvaluation {
    let mut control = ControlEvaluation::new("Filesystem hygiene", CONTROL_ID)
        .with_remediation_guide(
            "Remove world-write permission from the listed paths (chmod o-w) and make sure \
             the evaluation account can write to the target directory",
        );

    control.add_assessment(
        "FS-01",
        "The target is a directory the evaluation can write to",
        vec!["filesystem".to_string()],
        vec![procedure(
            "fs-01-writable",
            "Target writability",
            Method::Test,
            vec![
                Step::new("target-is-directory", target_is_directory),
                Step::new("write-probe", write_probe),
            ],
        )],
    );

    control.add_assessment(
        "FS-02",
        "No entry under the target is world-writable",
        vec!["filesystem".to_string(), "permissions".to_string()],
        vec![procedure(
            "fs-02-world-writable",
            "World-writable entries",
            Method::Test,
            vec![Step::new("no-world-writable", no_world_writable)],
        )
        .with_remediation_guide("chmod o-w <path>")],
    );

    control.add_assessment(
        "FS-03",
        "Backups of the target are retained for the required period",
        vec!["manual".to_string()],
        vec![procedure(
            "fs-03-backup-retention",
            "Backup retention",
            Method::Observation,
            vec![Step::new("operator-confirms-retention", backup_retention)],
        )],
    );

    control
}

fn procedure(id: &str, name: &str, method: Method, steps: Vec<Step>) -> Procedure {
    match Procedure::new(id, name, "", method, steps) {
        Ok(procedure) => procedure,
        Err(rejected) => rejected.into_inner(),
    }
}

fn target_of(payload: &dyn Any) -> Result<&FsTarget, (Outcome, String)> {
    payload
        .downcast_ref::<FsTarget>()
        .ok_or_else(|| (Outcome::Unknown, "payload is not a filesystem target".to_string()))
}

fn target_is_directory(payload: &dyn Any, _changes: &mut ChangeSet) -> (Outcome, String) {
    let target = match target_of(payload) {
        Ok(target) => target,
        Err(unknown) => return unknown,
    };

    if target.root.is_dir() {
        (
            Outcome::Passed,
            format!("{} is a directory", target.root.display()),
        )
    } else {
        (
            Outcome::Failed,
            format!("{} is not a directory", target.root.display()),
        )
    }
}

/// Registers a change that creates a probe file, applies it and checks the file
fn write_probe(payload: &dyn Any, changes: &mut ChangeSet) -> (Outcome, String) {
    let target = match target_of(payload) {
        Ok(target) => target,
        Err(unknown) => return unknown,
    };

    let probe = target.probe_path();
    let target_name = probe.display().to_string();
    let (create, remove) = (probe.clone(), probe.clone());

    let change = changes.register(
        PROBE_CHANGE,
        target_name.clone(),
        "Create a probe file to verify write access",
        json!({ "path": target_name }),
        move |_input: &Value| -> Result<Value, BoxError> {
            fs::write(&create, b"attest write probe\n")?;
            Ok(json!({ "created": create.display().to_string() }))
        },
        move |_data: &Value| -> Result<(), BoxError> {
            remove_if_present(&remove)?;
            Ok(())
        },
    );

    let (applied, _) = change.apply(&target_name, json!({ "path": target_name }), &Value::Null);
    if !applied {
        if change.allowed {
            return (
                Outcome::Failed,
                format!("could not write probe file {}", target_name),
            );
        }
        return (
            Outcome::NeedsReview,
            "changes are not allowed; write access was not verified".to_string(),
        );
    }

    if probe.is_file() {
        (
            Outcome::Passed,
            format!("probe file {} written", target_name),
        )
    } else {
        (
            Outcome::Failed,
            format!("probe file {} missing after write", target_name),
        )
    }
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn no_world_writable(payload: &dyn Any, _changes: &mut ChangeSet) -> (Outcome, String) {
    let target = match target_of(payload) {
        Ok(target) => target,
        Err(unknown) => return unknown,
    };
    scan_world_writable(&target.root)
}

#[cfg(unix)]
fn scan_world_writable(root: &Path) -> (Outcome, String) {
    use std::os::unix::fs::PermissionsExt;

    let mut offenders = Vec::new();
    let mut unreadable = 0usize;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => {
                unreadable += 1;
                continue;
            }
        };
        if entry.path_is_symlink() {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) if metadata.permissions().mode() & 0o002 != 0 => {
                offenders.push(entry.path().display().to_string());
            }
            Ok(_) => {}
            Err(_) => unreadable += 1,
        }
    }

    if !offenders.is_empty() {
        let total = offenders.len();
        offenders.truncate(MAX_REPORTED_PATHS);
        let mut message = format!("{} world-writable entries: {}", total, offenders.join(", "));
        if total > MAX_REPORTED_PATHS {
            message.push_str(", ...");
        }
        return (Outcome::Failed, message);
    }
    if unreadable > 0 {
        return (
            Outcome::NeedsReview,
            format!("{} entries could not be inspected", unreadable),
        );
    }
    (
        Outcome::Passed,
        format!("no world-writable entries under {}", root.display()),
    )
}

#[cfg(not(unix))]
fn scan_world_writable(root: &Path) -> (Outcome, String) {
    let entries = WalkDir::new(root).into_iter().filter_map(|e| e.ok()).count();
    (
        Outcome::NeedsReview,
        format!(
            "world-writable permissions cannot be checked on this platform ({} entries under {})",
            entries,
            root.display()
        ),
    )
}

fn backup_retention(_payload: &dyn Any, _changes: &mut ChangeSet) -> (Outcome, String) {
    (
        Outcome::NeedsReview,
        "backup retention must be confirmed by an operator".to_string(),
    )
}

/// Assessments of the built-in control, for listing
pub fn describe(control: &ControlEvaluation) -> Vec<(&str, &[String])> {
    control
        .assessments
        .iter()
        .map(|a: &Assessment| (a.requirement_id.as_str(), a.applicability.as_slice()))
        .collect()
}
