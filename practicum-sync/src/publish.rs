//! Publish the student store as a static site.
//!
//! ```text
//! <site_dir>/
//! ├── profiles/<username>.html   one page per parseable profile.md
//! ├── avatars/<username>.<ext>   copied from the student folder
//! └── data/<code>.json           one index per catalog course with students
//! ```
//!
//! Pages and indexes go through the hash-gated writer, with digests kept in
//! `<state_dir>/site.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use practicum_core::config::Config;
use practicum_core::store::write_atomic;
use practicum_core::types::{Course, Username};
use practicum_core::{DocumentStore, StudentDocument};
use practicum_renderer::{PageContext, Renderer};

use crate::error::{io_err, json_err, SyncError};
use crate::hash_store;
use crate::merge::read_field;
use crate::writer::{atomic_write, WriteResult};

/// Avatar extensions looked up, in priority order.
const AVATAR_EXTENSIONS: &[&str] = &["webp", "jpg", "jpeg", "png"];

/// Result of one publish pass.
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    pub pages: Vec<WriteResult>,
    pub avatars: Vec<WriteResult>,
    pub indexes: Vec<WriteResult>,
    /// Students whose profile could not be read or parsed.
    pub failures: Vec<(Username, String)>,
}

impl PublishReport {
    /// Every file that was (or would be) written.
    pub fn changed(&self) -> impl Iterator<Item = &WriteResult> {
        self.pages
            .iter()
            .chain(&self.avatars)
            .chain(&self.indexes)
            .filter(|r| r.is_change())
    }
}

// ---------------------------------------------------------------------------
// Course index payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseIndex {
    pub course: CourseInfo,
    pub university: UniversityInfo,
    pub students: Vec<IndexedStudent>,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    pub code: String,
    pub name: String,
    pub title: String,
    pub sequence: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UniversityInfo {
    pub name: String,
    pub degree: String,
    pub major: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedStudent {
    pub username: String,
    pub name: String,
    pub email: String,
    pub semester: String,
    pub project_title: String,
    pub tags: Vec<String>,
    pub profile_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_students: usize,
    pub total_projects: usize,
    pub semesters: BTreeMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

struct Published {
    username: Username,
    doc: StudentDocument,
    avatar: Option<String>,
}

/// Render every student profile under `root` into the site directory.
pub fn publish(root: &Path, config: &Config, dry_run: bool) -> Result<PublishReport, SyncError> {
    let store = DocumentStore::new(config.students_dir_at(root));
    let site_dir = config.site_dir_at(root);
    let store_path = hash_store::site_store_path_at(&config.state_dir_at(root));
    let renderer = Renderer::with_overrides(config.templates_dir_at(root).as_deref())?;

    let mut hashes = hash_store::load_from(&store_path)?;
    let mut report = PublishReport::default();
    let mut published = Vec::new();

    for username in store.list_usernames()? {
        let doc = match store.load(&username, &config.courses) {
            Ok(Some(doc)) => doc,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(%username, "not published: {e}");
                report.failures.push((username, e.to_string()));
                continue;
            }
        };

        let avatar = match find_avatar(&store.student_dir(&username)) {
            Some(source) => {
                let (result, file_name) = copy_avatar(&source, &site_dir, &username, dry_run)?;
                report.avatars.push(result);
                Some(format!("../avatars/{file_name}"))
            }
            None => None,
        };

        let page = renderer.profile_page(&PageContext::from_document(
            &doc,
            username.as_str(),
            avatar.clone(),
        ))?;
        let key = format!("profiles/{}.html", username.as_str());
        report.pages.push(atomic_write(
            &site_dir.join(&key),
            &key,
            &page,
            &mut hashes.files,
            dry_run,
        )?);

        published.push(Published {
            username,
            doc,
            avatar,
        });
    }

    for course in config.courses_in_sequence() {
        let Some(index) = course_index(course, config, &published) else {
            tracing::debug!("no students for {}", course.code);
            continue;
        };
        let key = format!("data/{}.json", course.code.as_str().to_lowercase());
        let path = site_dir.join(&key);
        let mut json = serde_json::to_string_pretty(&index).map_err(|e| json_err(&path, e))?;
        json.push('\n');
        report
            .indexes
            .push(atomic_write(&path, &key, &json, &mut hashes.files, dry_run)?);
    }

    if !dry_run && report.changed().next().is_some() {
        hashes.synced_at = Some(chrono::Utc::now());
        hash_store::save_to(&store_path, &hashes)?;
    }
    Ok(report)
}

/// `avatar.<ext>` in the student folder or its `assets/`, first match wins.
fn find_avatar(student_dir: &Path) -> Option<PathBuf> {
    [student_dir.to_path_buf(), student_dir.join("assets")]
        .iter()
        .flat_map(|dir| AVATAR_EXTENSIONS.iter().map(move |ext| dir.join(format!("avatar.{ext}"))))
        .find(|p| p.is_file())
}

fn copy_avatar(
    source: &Path,
    site_dir: &Path,
    username: &Username,
    dry_run: bool,
) -> Result<(WriteResult, String), SyncError> {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();
    let file_name = format!("{}.{ext}", username.as_str());
    let target = site_dir.join("avatars").join(&file_name);

    let bytes = std::fs::read(source).map_err(|e| io_err(source, e))?;
    let current = match std::fs::read(&target) {
        Ok(current) => Some(current),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(io_err(&target, e)),
    };
    if current.as_deref() == Some(bytes.as_slice()) {
        return Ok((WriteResult::Unchanged { path: target }, file_name));
    }
    if dry_run {
        return Ok((WriteResult::WouldWrite { path: target }, file_name));
    }

    write_atomic(&target, &bytes)?;
    tracing::info!("wrote: {}", target.display());
    Ok((WriteResult::Written { path: target }, file_name))
}

/// Index of everyone who took `course`; `None` when nobody did.
fn course_index(course: &Course, config: &Config, published: &[Published]) -> Option<CourseIndex> {
    let mut students = Vec::new();
    let mut semesters: BTreeMap<String, usize> = BTreeMap::new();

    for entry in published {
        let fm = &entry.doc.front_matter;
        let listed = fm.courses.iter().find(|c| c.code == course.code);
        let section = entry
            .doc
            .practicum_index(&course.code)
            .map(|idx| &entry.doc.sections[idx]);
        if listed.is_none() && section.is_none() {
            continue;
        }

        let semester = listed
            .map(|c| c.semester.clone())
            .unwrap_or_else(|| fm.semester.clone());
        if !semester.is_empty() {
            *semesters.entry(semester.clone()).or_default() += 1;
        }

        let raw = section.map(|s| s.raw.as_str()).unwrap_or_default();
        let tags = read_field(raw, "Tags")
            .map(|t| {
                t.split(',')
                    .map(|tag| tag.trim().to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        students.push(IndexedStudent {
            username: entry.username.to_string(),
            name: if fm.name.is_empty() {
                entry.username.to_string()
            } else {
                fm.name.clone()
            },
            email: fm.email.clone(),
            semester,
            project_title: read_field(raw, "Title").unwrap_or_default(),
            tags,
            profile_url: profile_url(config, &entry.username),
            avatar: entry
                .avatar
                .as_ref()
                .map(|a| a.trim_start_matches("../").to_string()),
        });
    }

    if students.is_empty() {
        return None;
    }
    let total_projects = students.iter().filter(|s| !s.project_title.is_empty()).count();
    Some(CourseIndex {
        course: CourseInfo {
            code: course.code.to_string(),
            name: course.display.clone(),
            title: course.section_heading(),
            sequence: course.sequence,
        },
        university: UniversityInfo {
            name: config.institution.university.clone(),
            degree: config.institution.degree.clone(),
            major: config.institution.major.clone(),
        },
        statistics: Statistics {
            total_students: students.len(),
            total_projects,
            semesters,
        },
        students,
    })
}

fn profile_url(config: &Config, username: &Username) -> String {
    let relative = format!("profiles/{}.html", username.as_str());
    match &config.site.base_url {
        Some(base) => format!("{}/{relative}", base.trim_end_matches('/')),
        None => relative,
    }
}
