//! Hash-gated atomic writer for generator-owned files.
//!
//! ## `atomic_write` protocol
//!
//! 1. Render content (already done by caller).
//! 2. Normalise line endings and SHA-256 hash the content.
//! 3. Compare with the stored hash → skip if identical and the file exists.
//! 4. In dry-run mode stop here and report `WouldWrite`.
//! 5. Write `<path>.tmp`, rename over `<path>` (see [`write_atomic`]).
//! 6. Update the hash entry; the caller saves the store.

use std::path::{Path, PathBuf};

use practicum_core::store::write_atomic;

use crate::error::SyncError;
use crate::hash_store::{digest, HashStore};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — rendered content matches the stored hash.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    /// Whether the file did (or would) change.
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

/// Atomically write `content` to `path` unless `hashes[key]` already matches.
pub fn atomic_write(
    path: &Path,
    key: &str,
    content: &str,
    hashes: &mut HashStore,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let normalized = content.replace("\r\n", "\n");
    let content = normalized.as_str();
    let hash = digest(content);

    if hashes.get(key) == Some(&hash) && path.exists() {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    write_atomic(path, content)?;
    hashes.insert(key.to_string(), hash);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str, hashes: &mut HashStore) -> WriteResult {
        atomic_write(path, "README.md", content, hashes, false).unwrap()
    }

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("README.md");
        let result = write(&path, "hello", &mut HashStore::new());
        assert!(matches!(result, WriteResult::Written { .. }));
        assert!(path.exists());
    }

    #[test]
    fn second_write_same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("README.md");
        let mut hashes = HashStore::new();
        write(&path, "same content", &mut hashes);
        let result = write(&path, "same content", &mut hashes);
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn changed_content_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("README.md");
        let mut hashes = HashStore::new();
        write(&path, "v1", &mut hashes);
        let result = write(&path, "v2", &mut hashes);
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn deleted_file_is_rewritten_even_with_matching_hash() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("README.md");
        let mut hashes = HashStore::new();
        write(&path, "v1", &mut hashes);
        fs::remove_file(&path).unwrap();
        assert!(matches!(write(&path, "v1", &mut hashes), WriteResult::Written { .. }));
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.md");
        let mut hashes = HashStore::new();
        let result = atomic_write(&path, "nope.md", "content", &mut hashes, true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
        assert!(hashes.is_empty());
    }

    #[test]
    fn crlf_and_lf_content_share_the_same_hash() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("normalize.md");
        let mut hashes = HashStore::new();

        let first = write(&path, "line1\r\nline2\r\n", &mut hashes);
        assert!(matches!(first, WriteResult::Written { .. }));

        let second = write(&path, "line1\nline2\n", &mut hashes);
        assert!(matches!(second, WriteResult::Unchanged { .. }));

        assert_eq!(fs::read_to_string(&path).unwrap(), "line1\nline2\n");
    }

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site").join("profiles").join("a.html");
        write(&path, "content", &mut HashStore::new());
        assert!(path.exists());
    }
}
