//! Roster run: CSV in, one [`Outcome`] per row, summary JSON out.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use practicum_core::config::Config;
use practicum_core::store::write_atomic;
use practicum_core::types::{CourseOffering, RosterRecord};
use practicum_roster::{normalize, read_roster, resolve_offering};

use crate::engine::{Outcome, SyncEngine};
use crate::error::{json_err, SyncError};

/// Run parameters shared by `sync` and `diff`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Course code overriding the CSV file name.
    pub course: Option<String>,
    /// Semester overriding the CSV file name.
    pub semester: Option<String>,
    pub dry_run: bool,
}

/// Result of one roster run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub csv_path: PathBuf,
    pub offering: CourseOffering,
    pub dry_run: bool,
    pub outcomes: Vec<Outcome>,
    /// Where the run summary was written (not in dry-run).
    pub summary_path: Option<PathBuf>,
}

/// Outcome totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub conflicts: usize,
}

impl OutcomeCounts {
    pub fn tally(outcomes: &[Outcome]) -> Self {
        let mut counts = OutcomeCounts::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Created { .. } => counts.created += 1,
                Outcome::Updated { changed: true, .. } => counts.updated += 1,
                Outcome::Updated { changed: false, .. } => counts.unchanged += 1,
                Outcome::Skipped { .. } => counts.skipped += 1,
                Outcome::Conflict { .. } => counts.conflicts += 1,
            }
        }
        counts
    }
}

impl RunReport {
    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(&self.outcomes)
    }
}

/// On-disk run summary at `<state_dir>/summaries/<course>_<semester>.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub course: String,
    pub course_code: String,
    pub semester: String,
    pub csv_file: String,
    pub processed_at: DateTime<Utc>,
    pub counts: OutcomeCounts,
    pub skipped: Vec<SkipEntry>,
    pub conflicts: Vec<ConflictEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkipEntry {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictEntry {
    pub username: String,
    pub reason: String,
}

/// `<state_dir>/summaries/<offering slug>.json`
pub fn summary_path_at(state_dir: &Path, offering: &CourseOffering) -> PathBuf {
    state_dir
        .join("summaries")
        .join(format!("{}.json", offering.slug()))
}

/// Read, normalise and plan every row of `csv_path`.
///
/// Rows are yielded in file order as `Ok(record)` or `Err(Skipped outcome)`.
pub(crate) fn load_records(
    csv_path: &Path,
    config: &Config,
    opts: &RunOptions,
) -> Result<(CourseOffering, Vec<Result<RosterRecord, Outcome>>), SyncError> {
    let offering = resolve_offering(
        csv_path,
        opts.course.as_deref(),
        opts.semester.as_deref(),
        config,
    )?;
    let rows = read_roster(csv_path)?;
    let records = rows
        .iter()
        .map(|row| {
            normalize(row, config).map_err(|rejection| {
                tracing::warn!(line = row.line, "skipping row: {rejection}");
                Outcome::Skipped {
                    line: row.line,
                    reason: rejection.to_string(),
                }
            })
        })
        .collect();
    Ok((offering, records))
}

/// Sync every row of the roster at `csv_path` into the repository at `root`.
///
/// Rows are processed one at a time in file order; a later row for the same
/// username sees the earlier row's committed result. Filesystem errors abort
/// the run, leaving already-processed rows committed.
pub fn run(
    root: &Path,
    config: &Config,
    csv_path: &Path,
    opts: &RunOptions,
) -> Result<RunReport, SyncError> {
    let (offering, records) = load_records(csv_path, config, opts)?;
    tracing::info!(
        "syncing {} rows for {} from {}",
        records.len(),
        offering,
        csv_path.display()
    );

    let engine = SyncEngine::new(root, config, offering.clone(), opts.dry_run)?;
    let mut outcomes = Vec::with_capacity(records.len());
    for record in records {
        let outcome = match record {
            Ok(record) => engine.sync(&record)?,
            Err(skipped) => skipped,
        };
        tracing::debug!("{outcome}");
        outcomes.push(outcome);
    }

    let mut report = RunReport {
        csv_path: csv_path.to_path_buf(),
        offering,
        dry_run: opts.dry_run,
        outcomes,
        summary_path: None,
    };
    if !opts.dry_run {
        report.summary_path = Some(write_summary(&config.state_dir_at(root), &report)?);
    }
    Ok(report)
}

fn write_summary(state_dir: &Path, report: &RunReport) -> Result<PathBuf, SyncError> {
    let summary = RunSummary {
        course: report.offering.course.display.clone(),
        course_code: report.offering.course.code.to_string(),
        semester: report.offering.semester.to_string(),
        csv_file: report.csv_path.display().to_string(),
        processed_at: Utc::now(),
        counts: report.counts(),
        skipped: report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Skipped { line, reason } => Some(SkipEntry {
                    line: *line,
                    reason: reason.clone(),
                }),
                _ => None,
            })
            .collect(),
        conflicts: report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Conflict {
                    username, reason, ..
                } => Some(ConflictEntry {
                    username: username.to_string(),
                    reason: reason.clone(),
                }),
                _ => None,
            })
            .collect(),
    };

    let path = summary_path_at(state_dir, &report.offering);
    let mut json = serde_json::to_string_pretty(&summary).map_err(|e| json_err(&path, e))?;
    json.push('\n');
    write_atomic(&path, &json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use practicum_core::types::Username;
    use tempfile::TempDir;

    const HEADER: &str =
        "Student Name,Email,Username,Project Title,GitHub,Presentation,Report,Profile Page\n";

    fn roster(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("2025_Summer_MSDS692.csv");
        std::fs::write(&path, format!("{HEADER}{body}")).unwrap();
        path
    }

    #[test]
    fn counts_tally_every_outcome() {
        let user = Username::from("a");
        let outcomes = vec![
            Outcome::Created { username: user.clone(), path: PathBuf::new() },
            Outcome::Updated { username: user.clone(), path: PathBuf::new(), changed: false },
            Outcome::Skipped { line: 3, reason: "x".into() },
        ];
        let counts = OutcomeCounts::tally(&outcomes);
        assert_eq!(counts.created, 1);
        assert_eq!(counts.unchanged, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.updated, 0);
    }

    #[test]
    fn run_writes_summary_with_skip_reasons() {
        let root = TempDir::new().unwrap();
        let csv = roster(
            &root,
            "\"John Doe\",jdoe@worldclass.regis.edu,jdoe001,Data Analysis Project,,,,\n\"No User\",x@regis.edu,,T,,,,\n",
        );
        let config = Config::default();
        let report = run(root.path(), &config, &csv, &RunOptions::default()).unwrap();

        assert_eq!(report.counts().created, 1);
        assert_eq!(report.counts().skipped, 1);
        let path = report.summary_path.expect("summary written");
        assert!(path.ends_with(".practicum/summaries/msds692_summer2025.json"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["counts"]["created"], 1);
        assert_eq!(json["skipped"][0]["line"], 3);
        assert_eq!(json["semester"], "Summer 2025");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let root = TempDir::new().unwrap();
        let csv = roster(&root, "\"John Doe\",jdoe@regis.edu,jdoe001,P,,,,\n");
        let opts = RunOptions { dry_run: true, ..RunOptions::default() };
        let report = run(root.path(), &Config::default(), &csv, &opts).unwrap();
        assert_eq!(report.counts().created, 1);
        assert!(report.summary_path.is_none());
        assert!(!root.path().join("data").exists());
        assert!(!root.path().join(".practicum").exists());
    }

    #[test]
    fn missing_required_column_aborts_before_any_row() {
        let root = TempDir::new().unwrap();
        let csv = root.path().join("2025_Summer_MSDS692.csv");
        std::fs::write(&csv, "Student Name,Email\nA B,a@b.c\n").unwrap();
        let err = run(root.path(), &Config::default(), &csv, &RunOptions::default()).unwrap_err();
        assert!(matches!(err, SyncError::Roster(_)));
        assert!(!root.path().join("data").exists());
    }
}
