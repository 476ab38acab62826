pub mod diff;
pub mod init;
pub mod render;
pub mod status;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};
use practicum_core::Config;

/// `practicum.yaml` under `root`, or the defaults when there is none.
pub(crate) fn load_config(root: &Path) -> Result<Config> {
    Config::load_at(root)
        .with_context(|| format!("failed to load config under '{}'", root.display()))
}
