//! `practicum init` — write the default `practicum.yaml`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use practicum_core::config::Config;

/// Write a default `practicum.yaml` under `--root`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Also create the configured students and state directories.
    #[arg(long)]
    pub create_dirs: bool,
}

impl InitArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("cannot create root '{}'", root.display()))?;
        let created = Config::init_at(root)
            .with_context(|| format!("failed to write config under '{}'", root.display()))?;

        let path = Config::path_at(root);
        if created {
            println!("✓ Wrote {}", path.display());
        } else {
            println!("· {} already exists, left unchanged", path.display());
        }

        if self.create_dirs {
            let config = super::load_config(root)?;
            for dir in [config.students_dir_at(root), config.state_dir_at(root)] {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("cannot create '{}'", dir.display()))?;
                println!("  {}", dir.display());
            }
        }
        Ok(())
    }
}
