//! `practicum render` — publish profile pages and course indexes.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use practicum_sync::{publish, WriteResult};

/// Arguments for `practicum render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl RenderArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let config = super::load_config(root)?;
        let report = publish(root, &config, self.dry_run)
            .with_context(|| format!("render failed under '{}'", root.display()))?;

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        let changed = report.changed().count();
        println!(
            "{prefix}✓ {} pages, {} course indexes ({} written)",
            report.pages.len(),
            report.indexes.len(),
            changed,
        );
        for result in report
            .pages
            .iter()
            .chain(&report.avatars)
            .chain(&report.indexes)
        {
            let path = result.path();
            let path = path.strip_prefix(root).unwrap_or(path).display();
            match result {
                WriteResult::Written { .. } => println!("  ✎  {path}"),
                WriteResult::WouldWrite { .. } => println!("  ~  {path}"),
                WriteResult::Unchanged { .. } => println!("  ·  {path}"),
            }
        }
        for (username, reason) in &report.failures {
            println!("{}", format!("  !  {username}: {reason}").red());
        }
        Ok(())
    }
}
