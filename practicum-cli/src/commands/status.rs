//! `practicum status` — students, their courses and section provenance.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use practicum_core::types::Provenance;
use practicum_sync::{student_statuses, StudentStatus};

/// Arguments for `practicum status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusReportJson<'a> {
    summary: StatusSummaryJson,
    students: &'a [StudentStatus],
}

#[derive(Serialize)]
struct StatusSummaryJson {
    students: usize,
    errors: usize,
    fully_generated: usize,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "student")]
    username: String,
    #[tabled(rename = "courses")]
    courses: String,
    #[tabled(rename = "generated")]
    generated: String,
    #[tabled(rename = "edited sections")]
    edited: String,
}

impl StatusArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let config = super::load_config(root)?;
        let statuses = student_statuses(root, &config)
            .with_context(|| format!("failed to read students under '{}'", root.display()))?;

        let errors = statuses.iter().filter(|s| s.error.is_some()).count();
        let fully_generated = statuses
            .iter()
            .filter(|s| s.error.is_none() && s.generated() == s.sections.len())
            .count();

        if self.json {
            let payload = StatusReportJson {
                summary: StatusSummaryJson {
                    students: statuses.len(),
                    errors,
                    fully_generated,
                },
                students: &statuses,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!(
            "Practicum v{} | {} students | {} untouched | {} unreadable",
            env!("CARGO_PKG_VERSION"),
            statuses.len(),
            fully_generated,
            errors,
        );
        if statuses.is_empty() {
            println!("No student folders yet. Run 'practicum sync <csv>' first.");
            return Ok(());
        }

        let rows: Vec<StatusTableRow> = statuses.iter().map(table_row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn table_row(status: &StudentStatus) -> StatusTableRow {
    if let Some(error) = &status.error {
        return StatusTableRow {
            username: status.username.to_string(),
            courses: String::new(),
            generated: "-".to_string(),
            edited: error.red().to_string(),
        };
    }
    let edited: Vec<&str> = status
        .sections
        .iter()
        .filter(|s| s.provenance == Provenance::StudentEdited)
        .map(|s| s.heading.as_str())
        .collect();
    StatusTableRow {
        username: status.username.to_string(),
        courses: status.courses.join(", "),
        generated: format!("{}/{}", status.generated(), status.sections.len()),
        edited: if edited.is_empty() {
            "none".bright_black().to_string()
        } else {
            edited.join(", ")
        },
    }
}
