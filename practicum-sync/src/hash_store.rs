//! Provenance store — SHA-256 digests of everything the generator wrote.
//!
//! One JSON document per student at `<state_dir>/hashes/<username>.json`:
//!
//! ```json
//! {
//!   "synced_at": "2025-06-01T12:00:00Z",
//!   "sections": { "about_me": "<sha256>", "practicum:msds692": "<sha256>" },
//!   "files":    { "README.md": "<sha256>" }
//! }
//! ```
//!
//! A section whose current text hashes to its stored digest is still the
//! generator's placeholder ([`Provenance::Generated`]); anything else,
//! including a section with no digest, belongs to the student.
//!
//! Published site files share the same format at `<state_dir>/site.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use practicum_core::store::write_atomic;
use practicum_core::types::{Provenance, Username};
use practicum_core::Section;

use crate::error::{io_err, json_err, SyncError};

/// Relative path (or logical name) → SHA-256 hex digest.
pub type HashStore = BTreeMap<String, String>;

/// On-disk provenance payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvenanceFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sections: HashStore,
    #[serde(default)]
    pub files: HashStore,
}

impl ProvenanceFile {
    /// Who owns `section` right now.
    pub fn provenance(&self, section: &Section) -> Provenance {
        match self.sections.get(&section.kind.key()) {
            Some(stored) if *stored == section_digest(&section.raw) => Provenance::Generated,
            _ => Provenance::StudentEdited,
        }
    }

    /// Remember `section` as generator output.
    pub fn record(&mut self, section: &Section) {
        self.sections
            .insert(section.kind.key(), section_digest(&section.raw));
    }
}

/// SHA-256 hex digest of `content`.
pub fn digest(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    hex::encode(h.finalize())
}

/// Digest of a section, ignoring trailing whitespace and line-ending style.
///
/// A section's trailing blank lines depend on what follows it, so they are
/// not part of its identity.
pub fn section_digest(raw: &str) -> String {
    digest(raw.replace("\r\n", "\n").trim_end())
}

/// `<state_dir>/hashes/<username>.json`
pub fn store_path_at(state_dir: &Path, username: &Username) -> PathBuf {
    state_dir
        .join("hashes")
        .join(format!("{}.json", username.as_str()))
}

/// `<state_dir>/site.json`
pub fn site_store_path_at(state_dir: &Path) -> PathBuf {
    state_dir.join("site.json")
}

/// Load the provenance file for `username`; empty when absent.
pub fn load_at(state_dir: &Path, username: &Username) -> Result<ProvenanceFile, SyncError> {
    load_from(&store_path_at(state_dir, username))
}

/// Save the provenance file for `username` atomically.
pub fn save_at(
    state_dir: &Path,
    username: &Username,
    store: &ProvenanceFile,
) -> Result<(), SyncError> {
    save_to(&store_path_at(state_dir, username), store)
}

pub(crate) fn load_from(path: &Path) -> Result<ProvenanceFile, SyncError> {
    if !path.exists() {
        return Ok(ProvenanceFile::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents).map_err(|e| json_err(path, e))
}

pub(crate) fn save_to(path: &Path, store: &ProvenanceFile) -> Result<(), SyncError> {
    let mut json = serde_json::to_string_pretty(store).map_err(|e| json_err(path, e))?;
    json.push('\n');
    write_atomic(path, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use practicum_core::SectionKind;
    use tempfile::TempDir;

    fn section(raw: &str) -> Section {
        Section::new(SectionKind::AboutMe, raw.to_string())
    }

    #[test]
    fn empty_store_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let store = load_at(tmp.path(), &Username::from("nobody")).unwrap();
        assert!(store.sections.is_empty());
        assert!(store.files.is_empty());
    }

    #[test]
    fn roundtrip_save_load() {
        let tmp = TempDir::new().unwrap();
        let user = Username::from("jdoe001");
        let mut store = ProvenanceFile {
            synced_at: Some(Utc::now()),
            ..ProvenanceFile::default()
        };
        store.record(&section("## About Me\n\nhello\n"));
        store.files.insert("README.md".to_string(), "cafebabe".to_string());

        save_at(tmp.path(), &user, &store).unwrap();
        let loaded = load_at(tmp.path(), &user).unwrap();
        assert_eq!(loaded, store);
        assert!(store_path_at(tmp.path(), &user).ends_with("hashes/jdoe001.json"));
    }

    #[test]
    fn recorded_section_is_generated_until_edited() {
        let mut store = ProvenanceFile::default();
        let original = section("## About Me\n\nplaceholder\n\n");
        store.record(&original);
        assert_eq!(store.provenance(&original), Provenance::Generated);

        // Trailing blank lines and CRLF do not count as edits.
        assert_eq!(
            store.provenance(&section("## About Me\r\n\r\nplaceholder\r\n")),
            Provenance::Generated
        );
        assert_eq!(
            store.provenance(&section("## About Me\n\nI build pipelines.\n")),
            Provenance::StudentEdited
        );
    }

    #[test]
    fn unknown_section_is_student_edited() {
        let store = ProvenanceFile::default();
        assert_eq!(
            store.provenance(&section("## About Me\n\nanything\n")),
            Provenance::StudentEdited
        );
    }

    #[test]
    fn corrupted_store_is_a_json_error() {
        let tmp = TempDir::new().unwrap();
        let user = Username::from("x");
        let path = store_path_at(tmp.path(), &user);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_at(tmp.path(), &user),
            Err(SyncError::Json { .. })
        ));
    }
}
