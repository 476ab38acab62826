//! Per-student provenance report for `practicum status`.

use std::path::Path;

use serde::Serialize;

use practicum_core::config::Config;
use practicum_core::types::{Provenance, Username};
use practicum_core::DocumentStore;

use crate::error::SyncError;
use crate::hash_store;

/// Provenance of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStatus {
    pub key: String,
    pub heading: String,
    pub provenance: Provenance,
}

/// One student folder as seen by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StudentStatus {
    pub username: Username,
    /// Course codes from front matter, in catalog order.
    pub courses: Vec<String>,
    pub sections: Vec<SectionStatus>,
    /// Set when `profile.md` is missing or unparseable, or its provenance
    /// file is corrupt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StudentStatus {
    /// Sections still exactly as generated.
    pub fn generated(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.provenance == Provenance::Generated)
            .count()
    }
}

/// Status of every student folder under `root`, sorted by username.
pub fn student_statuses(root: &Path, config: &Config) -> Result<Vec<StudentStatus>, SyncError> {
    let store = DocumentStore::new(config.students_dir_at(root));
    let state_dir = config.state_dir_at(root);

    let mut statuses = Vec::new();
    for username in store.list_usernames()? {
        let mut status = StudentStatus {
            username: username.clone(),
            courses: Vec::new(),
            sections: Vec::new(),
            error: None,
        };
        match store.load(&username, &config.courses) {
            Ok(Some(doc)) => {
                let provenance = match hash_store::load_at(&state_dir, &username) {
                    Ok(provenance) => provenance,
                    Err(e @ SyncError::Json { .. }) => {
                        status.error = Some(e.to_string());
                        statuses.push(status);
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                status.courses = doc
                    .front_matter
                    .courses
                    .iter()
                    .map(|c| c.code.to_string())
                    .collect();
                status.sections = doc
                    .sections
                    .iter()
                    .map(|s| SectionStatus {
                        key: s.kind.key(),
                        heading: s.heading.clone(),
                        provenance: provenance.provenance(s),
                    })
                    .collect();
            }
            Ok(None) => status.error = Some("no profile.md".to_string()),
            Err(e) => status.error = Some(e.to_string()),
        }
        statuses.push(status);
    }
    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{run, RunOptions};
    use tempfile::TempDir;

    #[test]
    fn fresh_profile_is_fully_generated_until_edited() {
        let root = TempDir::new().unwrap();
        let csv = root.path().join("2025_Summer_MSDS692.csv");
        std::fs::write(
            &csv,
            "Student Name,Email,Username,Project Title\n\"John Doe\",jdoe@regis.edu,jdoe001,Forecasting Demand\n",
        )
        .unwrap();
        let config = Config::default();
        run(root.path(), &config, &csv, &RunOptions::default()).unwrap();

        let statuses = student_statuses(root.path(), &config).unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].courses, vec!["MSDS692"]);
        assert_eq!(statuses[0].generated(), 4);

        let profile = root.path().join("data/students/jdoe001/profile.md");
        let text = std::fs::read_to_string(&profile).unwrap();
        std::fs::write(&profile, text.replace("## About Me\n", "## About Me\n\nI like maps.\n"))
            .unwrap();

        let statuses = student_statuses(root.path(), &config).unwrap();
        let about = statuses[0]
            .sections
            .iter()
            .find(|s| s.key == "about_me")
            .unwrap();
        assert_eq!(about.provenance, Provenance::StudentEdited);
        assert_eq!(statuses[0].generated(), 3);
    }

    #[test]
    fn corrupt_provenance_file_is_reported_per_student() {
        let root = TempDir::new().unwrap();
        let csv = root.path().join("2025_Summer_MSDS692.csv");
        std::fs::write(
            &csv,
            "Student Name,Email,Username,Project Title\n\"John Doe\",jdoe@regis.edu,jdoe001,Forecasting\n\"Ann Lee\",alee@regis.edu,alee002,Churn\n",
        )
        .unwrap();
        let config = Config::default();
        run(root.path(), &config, &csv, &RunOptions::default()).unwrap();
        std::fs::write(root.path().join(".practicum/hashes/jdoe001.json"), "{ not json").unwrap();

        let statuses = student_statuses(root.path(), &config).unwrap();
        assert_eq!(statuses[0].username.as_str(), "alee002");
        assert!(statuses[0].error.is_none());
        assert_eq!(statuses[1].username.as_str(), "jdoe001");
        assert!(statuses[1].error.is_some());
        assert!(statuses[1].sections.is_empty());
    }

    #[test]
    fn folder_without_profile_reports_error() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("data/students/ghost")).unwrap();
        let statuses = student_statuses(root.path(), &Config::default()).unwrap();
        assert_eq!(statuses[0].error.as_deref(), Some("no profile.md"));
    }
}
