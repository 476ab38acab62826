//! `practicum sync <csv>` — merge one roster into the student folders.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use practicum_sync::{pipeline, Outcome, OutcomeCounts, RunOptions, RunReport};

/// Course and semester selection shared by `sync` and `diff`.
#[derive(Args, Debug, Clone)]
pub struct RosterArgs {
    /// Roster CSV, e.g. `2025_Summer_MSDS692.csv`.
    pub csv: PathBuf,

    /// Course code; defaults to the one in the CSV file name.
    #[arg(long)]
    pub course: Option<String>,

    /// Semester such as "Summer 2025"; defaults to the one in the CSV file name.
    #[arg(long)]
    pub semester: Option<String>,
}

impl RosterArgs {
    pub fn options(&self, dry_run: bool) -> RunOptions {
        RunOptions {
            course: self.course.clone(),
            semester: self.semester.clone(),
            dry_run,
        }
    }
}

/// Arguments for `practicum sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub roster: RosterArgs,

    /// Report what would happen without writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SyncReportJson<'a> {
    course: &'a str,
    semester: String,
    dry_run: bool,
    counts: OutcomeCounts,
    outcomes: &'a [Outcome],
}

impl SyncArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let config = super::load_config(root)?;
        let csv = &self.roster.csv;
        let report = pipeline::run(root, &config, csv, &self.roster.options(self.dry_run))
            .with_context(|| format!("sync failed for '{}'", csv.display()))?;

        if self.json {
            let payload = SyncReportJson {
                course: &report.offering.course.display,
                semester: report.offering.semester.to_string(),
                dry_run: report.dry_run,
                counts: report.counts(),
                outcomes: &report.outcomes,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
            );
            return Ok(());
        }

        print_report(root, &report);
        Ok(())
    }
}

fn print_report(root: &Path, report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let counts = report.counts();
    println!(
        "{prefix}✓ {} ({} created, {} updated, {} unchanged, {} skipped, {} conflicts)",
        report.offering,
        counts.created,
        counts.updated,
        counts.unchanged,
        counts.skipped,
        counts.conflicts,
    );

    for outcome in &report.outcomes {
        let line = match outcome {
            Outcome::Created { username, path } => {
                format!("  +  {username}  {}", relative(root, path)).green().to_string()
            }
            Outcome::Updated { username, path, changed: true } => {
                format!("  ✎  {username}  {}", relative(root, path))
            }
            Outcome::Updated { username, changed: false, .. } => {
                format!("  ·  {username}").bright_black().to_string()
            }
            Outcome::Skipped { line, reason } => {
                format!("  -  line {line}: {reason}").yellow().to_string()
            }
            Outcome::Conflict { username, reason, .. } => {
                format!("  !  {username}: {reason}").red().to_string()
            }
        };
        println!("{line}");
    }

    if let Some(path) = &report.summary_path {
        println!("Summary: {}", relative(root, path));
    }
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
