//! Unified diff support for `practicum diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use practicum_core::config::Config;
use practicum_core::types::CourseOffering;

use crate::engine::{Outcome, PlanKind, SyncEngine};
use crate::pipeline::{load_records, RunOptions};
use crate::SyncError;

/// A single file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff result for a roster.
#[derive(Debug, Clone)]
pub struct DiffReport {
    pub offering: CourseOffering,
    pub diffs: Vec<FileDiff>,
    /// Rows that would be skipped or conflict; they produce no diff.
    pub notes: Vec<Outcome>,
}

/// Compute what syncing `csv_path` would change, as unified diffs.
///
/// No files are written. Each row is planned against the current disk state.
pub fn diff_roster(
    root: &Path,
    config: &Config,
    csv_path: &Path,
    opts: &RunOptions,
) -> Result<DiffReport, SyncError> {
    let (offering, records) = load_records(csv_path, config, opts)?;
    let engine = SyncEngine::new(root, config, offering.clone(), true)?;

    let mut diffs = Vec::new();
    let mut notes = Vec::new();
    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(skipped) => {
                notes.push(skipped);
                continue;
            }
        };
        let plan = engine.plan(&record)?;
        if let PlanKind::Conflict(reason) = &plan.kind {
            notes.push(Outcome::Conflict {
                username: plan.username.clone(),
                path: plan.profile_path.clone(),
                reason: reason.clone(),
            });
            continue;
        }

        if let Some(after) = &plan.after {
            let before = plan.before.as_deref().unwrap_or_default();
            push_diff(&mut diffs, root, &plan.profile_path, before, after);
        }
        if let Some(readme) = &plan.readme {
            let existing = read_existing_or_empty(&plan.readme_path)?;
            push_diff(&mut diffs, root, &plan.readme_path, &existing, readme);
        }
    }

    Ok(DiffReport {
        offering,
        diffs,
        notes,
    })
}

fn push_diff(diffs: &mut Vec<FileDiff>, root: &Path, path: &Path, old: &str, new: &str) {
    if old == new {
        return;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    let old_header = format!("a/{}", relative.display());
    let new_header = format!("b/{}", relative.display());
    let unified = TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    diffs.push(FileDiff {
        path: path.to_path_buf(),
        unified_diff: unified,
    });
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.replace("\r\n", "\n")),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(crate::error::io_err(path, err)),
    }
}
