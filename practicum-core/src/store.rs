//! On-disk student document store.
//!
//! # Storage layout
//!
//! ```text
//! <students_dir>/
//!   <username>/
//!     profile.md        (student document — front matter + sections)
//!     README.md         (generator-owned instructions)
//!     reports/
//!     presentations/
//!     assets/
//! ```
//!
//! Every write goes through [`write_atomic`]: content lands in a `.tmp`
//! sibling first and is renamed over the target, so a document is either the
//! old version or the new one, never a torn mix.

use std::path::{Path, PathBuf};

use crate::document::StudentDocument;
use crate::error::{io_err, StoreError};
use crate::types::{Course, Username};

/// Sub-folders provisioned in every student folder.
pub const STUDENT_SUBDIRS: &[&str] = &["reports", "presentations", "assets"];

/// File name of the student document.
pub const PROFILE_FILE: &str = "profile.md";

/// File name of the generated per-student instructions.
pub const README_FILE: &str = "README.md";

/// Filesystem-backed store of student documents, keyed by username.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Store rooted at `students_dir` (the directory holding one folder per student).
    pub fn new(students_dir: impl Into<PathBuf>) -> Self {
        DocumentStore {
            root: students_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -----------------------------------------------------------------------
    // 1. Path helpers — pure, no I/O
    // -----------------------------------------------------------------------

    /// `<root>/<username>/`
    pub fn student_dir(&self, username: &Username) -> PathBuf {
        self.root.join(username.as_str())
    }

    /// `<root>/<username>/profile.md`
    pub fn profile_path(&self, username: &Username) -> PathBuf {
        self.student_dir(username).join(PROFILE_FILE)
    }

    /// `<root>/<username>/README.md`
    pub fn readme_path(&self, username: &Username) -> PathBuf {
        self.student_dir(username).join(README_FILE)
    }

    // -----------------------------------------------------------------------
    // 2. Lookup
    // -----------------------------------------------------------------------

    /// Whether a folder exists for `username`.
    pub fn exists(&self, username: &Username) -> bool {
        self.student_dir(username).is_dir()
    }

    /// Usernames of every student folder, sorted.
    pub fn list_usernames(&self) -> Result<Vec<Username>, StoreError> {
        if !self.root.exists() {
            return Ok(vec![]);
        }
        let entries = std::fs::read_dir(&self.root).map_err(|e| io_err(&self.root, e))?;
        let mut names: Vec<Username> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .map(Username::from)
            .collect();
        names.sort();
        Ok(names)
    }

    // -----------------------------------------------------------------------
    // 3. Load
    // -----------------------------------------------------------------------

    /// Raw `profile.md` text, or `None` when the student has no document.
    pub fn read_profile(&self, username: &Username) -> Result<Option<String>, StoreError> {
        let path = self.profile_path(username);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(path, e)),
        }
    }

    /// Parsed `profile.md`, or `None` when absent.
    ///
    /// Returns `StoreError::Parse` (with the path) if the document is malformed.
    pub fn load(
        &self,
        username: &Username,
        catalog: &[Course],
    ) -> Result<Option<StudentDocument>, StoreError> {
        let Some(text) = self.read_profile(username)? else {
            return Ok(None);
        };
        StudentDocument::parse(&text, catalog)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.profile_path(username),
                source,
            })
    }

    // -----------------------------------------------------------------------
    // 4. Save (atomic)
    // -----------------------------------------------------------------------

    /// Create the student folder and its sub-folders if missing.
    pub fn provision(&self, username: &Username) -> Result<PathBuf, StoreError> {
        let dir = self.student_dir(username);
        for sub in STUDENT_SUBDIRS {
            let path = dir.join(sub);
            std::fs::create_dir_all(&path).map_err(|e| io_err(&path, e))?;
        }
        Ok(dir)
    }

    /// Atomically replace `profile.md` for `username`.
    pub fn save_profile(&self, username: &Username, content: &str) -> Result<PathBuf, StoreError> {
        let path = self.profile_path(username);
        write_atomic(&path, content)?;
        Ok(path)
    }
}

/// Write `content` to `path` all-or-nothing.
///
/// Write flow: parent dirs → `<path>.tmp` → `rename`. The `.tmp` sibling lives
/// in the same directory (same filesystem, so the rename is atomic) and is
/// removed if the rename fails.
pub fn write_atomic(path: &Path, content: impl AsRef<[u8]>) -> Result<(), StoreError> {
    let tmp = tmp_path(path);
    write_atomic_with_tmp(path, content.as_ref(), &tmp)
}

/// `<path>.tmp`
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.tmp", path.display()))
}

fn write_atomic_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
