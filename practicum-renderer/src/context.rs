//! Template contexts — serializable rendering payloads built from core types.
//!
//! Each template sees exactly one top-level key (`profile`, `practicum`,
//! `readme` or `page`), so user override templates have a stable shape.

use serde::{Deserialize, Serialize};

use practicum_core::config::Institution;
use practicum_core::types::{Course, RosterRecord};
use practicum_core::{SectionKind, StudentDocument};

use crate::error::RenderError;
use crate::markdown;

/// Student identity, used by the About Me, Skills and Contact sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileContext {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub university: String,
    pub degree: String,
    pub major: String,
}

impl ProfileContext {
    pub fn new(record: &RosterRecord, institution: &Institution) -> Self {
        ProfileContext {
            name: record.full_name.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            username: record.username.to_string(),
            university: institution.university.clone(),
            degree: institution.degree.clone(),
            major: institution.major.clone(),
        }
    }
}

/// Markdown link `[text](url)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCtx {
    pub text: String,
    pub url: String,
}

/// One course's project section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticumContext {
    pub heading: String,
    pub course: String,
    pub label: String,
    pub title: String,
    pub tags: Vec<String>,
    pub github: LinkCtx,
    pub report: LinkCtx,
    pub presentation: LinkCtx,
}

impl PracticumContext {
    /// Roster links win; missing ones fall back to the expected upload paths.
    pub fn new(record: &RosterRecord, course: &Course, tags: Vec<String>) -> Self {
        let files = CourseFiles::new(record.username.as_str(), course);
        let links = &record.links;
        PracticumContext {
            heading: course.section_heading(),
            course: course.display.clone(),
            label: course.label.clone(),
            title: record.project_title.clone(),
            tags,
            github: match &links.github {
                Some(url) => LinkCtx { text: url.clone(), url: url.clone() },
                None => LinkCtx {
                    text: "Add your GitHub link".to_string(),
                    url: "#".to_string(),
                },
            },
            report: LinkCtx {
                text: "Download Report".to_string(),
                url: links
                    .report
                    .clone()
                    .unwrap_or_else(|| format!("../reports/{}", files.report_file)),
            },
            presentation: LinkCtx {
                text: "View Slides".to_string(),
                url: links
                    .presentation
                    .clone()
                    .unwrap_or_else(|| format!("../presentations/{}", files.slides_file)),
            },
        }
    }
}

/// Expected upload file names for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFiles {
    pub display: String,
    pub label: String,
    pub report_file: String,
    pub slides_file: String,
}

impl CourseFiles {
    /// `<username>_practicum<label>_report.pdf` / `..._slides.pdf`
    pub fn new(username: &str, course: &Course) -> Self {
        let label = course.label.to_lowercase();
        CourseFiles {
            display: course.display.clone(),
            label: course.label.clone(),
            report_file: format!("{username}_practicum{label}_report.pdf"),
            slides_file: format!("{username}_practicum{label}_slides.pdf"),
        }
    }
}

/// The generator-owned `README.md` of a student folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeContext {
    pub name: String,
    pub username: String,
    pub courses: Vec<CourseFiles>,
}

impl ReadmeContext {
    /// `courses` should already be in sequence order.
    pub fn new(name: &str, username: &str, courses: &[&Course]) -> Self {
        ReadmeContext {
            name: name.to_string(),
            username: username.to_string(),
            courses: courses
                .iter()
                .map(|c| CourseFiles::new(username, c))
                .collect(),
        }
    }
}

/// One section of the published HTML page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSection {
    pub heading: String,
    pub key: String,
    pub css_class: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCourse {
    pub course: String,
    pub semester: String,
}

/// A student's published profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    pub name: String,
    pub username: String,
    pub email: String,
    pub degree: String,
    pub university: String,
    pub graduation: String,
    /// Path of the avatar relative to the page, if one was found.
    pub avatar: Option<String>,
    pub courses: Vec<PageCourse>,
    pub sections: Vec<PageSection>,
}

impl PageContext {
    pub fn from_document(doc: &StudentDocument, username: &str, avatar: Option<String>) -> Self {
        let fm = &doc.front_matter;
        let sections = doc
            .sections
            .iter()
            .map(|s| {
                let key = s.kind.key();
                PageSection {
                    heading: s.heading.clone(),
                    css_class: css_class(&s.kind),
                    key,
                    html: markdown::to_html(s.body()),
                }
            })
            .collect();
        let name = if fm.name.is_empty() {
            format!("{} {}", fm.first_name, fm.last_name).trim().to_string()
        } else {
            fm.name.clone()
        };
        PageContext {
            name: if name.is_empty() { username.to_string() } else { name },
            username: username.to_string(),
            email: fm.email.clone(),
            degree: fm.degree.clone(),
            university: fm.university.clone(),
            graduation: fm.graduation.clone(),
            avatar,
            courses: fm
                .courses
                .iter()
                .map(|c| PageCourse {
                    course: c.course.clone(),
                    semester: c.semester.clone(),
                })
                .collect(),
            sections,
        }
    }
}

fn css_class(kind: &SectionKind) -> String {
    kind.key()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Wrap a payload under `key` and convert to a [`tera::Context`].
pub(crate) fn to_tera_context<T: Serialize>(key: &str, value: &T) -> Result<tera::Context, RenderError> {
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(tera::Context::from_value(serde_json::Value::Object(map))?)
}
