//! CSV ingest: header matching and raw row extraction.
//!
//! Rosters come from different exports, so columns are found by name rather
//! than position. Header matching ignores case, surrounding whitespace and a
//! leading UTF-8 BOM; unknown columns are ignored.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::RosterError;

/// One CSV row with every known column pulled out as text (empty when absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterRow {
    /// 1-based line number in the file (header is line 1).
    pub line: usize,
    pub student_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub project_title: String,
    pub github: String,
    pub presentation: String,
    pub report: String,
    pub profile_page: String,
}

/// Column name aliases, compared after [`normalize_header`].
const STUDENT_NAME: &[&str] = &["student name", "name", "full name"];
const FIRST_NAME: &[&str] = &["first name", "firstname"];
const LAST_NAME: &[&str] = &["last name", "lastname"];
const EMAIL: &[&str] = &["email", "email address", "e-mail"];
const USERNAME: &[&str] = &["username", "user name", "login"];
const PROJECT_TITLE: &[&str] = &["project title", "title", "project"];
const GITHUB: &[&str] = &["github", "github repository", "github link"];
const PRESENTATION: &[&str] = &["presentation", "slides", "presentation slides"];
const REPORT: &[&str] = &["report", "project report"];
const PROFILE_PAGE: &[&str] = &["profile page", "profile"];

fn normalize_header(header: &str) -> String {
    header
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolved column positions for one CSV file.
#[derive(Debug, Default)]
struct Columns {
    student_name: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    email: Option<usize>,
    username: Option<usize>,
    project_title: Option<usize>,
    github: Option<usize>,
    presentation: Option<usize>,
    report: Option<usize>,
    profile_page: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));
        Columns {
            student_name: find(STUDENT_NAME),
            first_name: find(FIRST_NAME),
            last_name: find(LAST_NAME),
            email: find(EMAIL),
            username: find(USERNAME),
            project_title: find(PROJECT_TITLE),
            github: find(GITHUB),
            presentation: find(PRESENTATION),
            report: find(REPORT),
            profile_page: find(PROFILE_PAGE),
        }
    }

    fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("Username".to_string());
        }
        if self.student_name.is_none() && self.first_name.is_none() {
            missing.push("Student Name".to_string());
        }
        missing
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Read every row of the roster at `path`.
pub fn read_roster(path: &Path) -> Result<Vec<RosterRow>, RosterError> {
    let file = std::fs::File::open(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_roster_from(file, path)
}

/// Read roster rows from any reader; `path` is only used in error messages.
pub fn read_roster_from<R: Read>(reader: R, path: &Path) -> Result<Vec<RosterRow>, RosterError> {
    let csv_err = |source| RosterError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_err)?.clone();
    let columns = Columns::resolve(&headers);
    let missing = columns.missing();
    if !missing.is_empty() {
        return Err(RosterError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push(RosterRow {
            line,
            student_name: cell(&record, columns.student_name),
            first_name: cell(&record, columns.first_name),
            last_name: cell(&record, columns.last_name),
            email: cell(&record, columns.email),
            username: cell(&record, columns.username),
            project_title: cell(&record, columns.project_title),
            github: cell(&record, columns.github),
            presentation: cell(&record, columns.presentation),
            report: cell(&record, columns.report),
            profile_page: cell(&record, columns.profile_page),
        });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read roster");
    Ok(rows)
}
