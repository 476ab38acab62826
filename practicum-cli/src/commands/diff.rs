//! `practicum diff <csv>` — show unified diffs for what sync would write.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use practicum_sync::diff_roster;

use super::sync::RosterArgs;

/// Arguments for `practicum diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub roster: RosterArgs,
}

impl DiffArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let config = super::load_config(root)?;
        let csv = &self.roster.csv;
        let result = diff_roster(root, &config, csv, &self.roster.options(true))
            .with_context(|| format!("diff failed for '{}'", csv.display()))?;

        // skipped rows and conflicts have nothing to diff
        for note in &result.notes {
            eprintln!("{note}");
        }

        if result.diffs.is_empty() {
            println!("No differences for {}.", result.offering);
            return Ok(());
        }

        for diff in result.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
