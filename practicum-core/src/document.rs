//! Student profile document: YAML front matter plus `## ` sections.
//!
//! # Layout
//!
//! ```text
//! ---
//! <front matter YAML>
//! ---
//! <preamble>
//! ## About Me
//! ...
//! ## Skills
//! ...
//! ## MSDS 692 - Practicum I
//! ...
//! ## Contact
//! ...
//! ```
//!
//! Sections are kept as raw text (heading line through the byte before the
//! next `## ` heading), so a section that is not touched is written back
//! exactly as it was read. Front matter is re-serialized only when its
//! structured value changed.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DocumentError;
use crate::types::{Course, CourseCode, ProjectLinks};

const FENCE: &str = "---";

// ---------------------------------------------------------------------------
// Front matter
// ---------------------------------------------------------------------------

/// Structured metadata at the top of `profile.md`.
///
/// Scalar fields accept any YAML scalar (students write `graduation: 2026`);
/// keys this type does not know are kept in `extra` and written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(default, skip_serializing_if = "ProjectLinks::is_empty")]
    pub links: ProjectLinks,
    /// Display form of the most advanced course taken (`MSDS 696`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub course: String,
    /// Semester of that course (`Summer 2025`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub semester: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub graduation: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub major: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub university: String,
    /// Every course offering the student appeared in, in course sequence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub courses: Vec<CourseEntry>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One course a student took, as recorded in front matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub code: CourseCode,
    /// Display form, e.g. `MSDS 692`.
    pub course: String,
    #[serde(deserialize_with = "lenient_string")]
    pub semester: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(D::Error::custom("expected a scalar value")),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// What a `## ` section is, decided from its heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    AboutMe,
    Skills,
    Practicum { code: CourseCode, sequence: u32 },
    Contact,
    /// Any heading the engine does not manage; always preserved.
    Other(String),
}

impl SectionKind {
    /// Classify a heading (text after `## `) against the course catalog.
    pub fn classify(heading: &str, catalog: &[Course]) -> SectionKind {
        if let Some(course) = catalog.iter().find(|c| c.matches_heading(heading)) {
            return SectionKind::Practicum {
                code: course.code.clone(),
                sequence: course.sequence,
            };
        }
        let lower = heading.to_lowercase();
        if lower.contains("about") {
            SectionKind::AboutMe
        } else if lower.contains("skill") {
            SectionKind::Skills
        } else if lower.contains("contact") {
            SectionKind::Contact
        } else {
            SectionKind::Other(heading.to_string())
        }
    }

    /// Stable key used by the provenance store.
    pub fn key(&self) -> String {
        match self {
            SectionKind::AboutMe => "about_me".to_string(),
            SectionKind::Skills => "skills".to_string(),
            SectionKind::Practicum { code, .. } => {
                format!("practicum:{}", code.as_str().to_lowercase())
            }
            SectionKind::Contact => "contact".to_string(),
            SectionKind::Other(heading) => format!("other:{}", heading.to_lowercase()),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::AboutMe => write!(f, "About Me"),
            SectionKind::Skills => write!(f, "Skills"),
            SectionKind::Practicum { code, .. } => write!(f, "Practicum {code}"),
            SectionKind::Contact => write!(f, "Contact"),
            SectionKind::Other(heading) => write!(f, "{heading}"),
        }
    }
}

/// One `## ` section, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Heading text without the `## ` marker.
    pub heading: String,
    /// Heading line through the end of the section, including blank lines.
    pub raw: String,
}

impl Section {
    /// Build a section from text whose first line is its `## ` heading.
    pub fn new(kind: SectionKind, raw: String) -> Self {
        let heading = heading_of(&raw).unwrap_or_default();
        Section { kind, heading, raw }
    }

    /// Section text after the heading line.
    pub fn body(&self) -> &str {
        match self.raw.find('\n') {
            Some(idx) => &self.raw[idx + 1..],
            None => "",
        }
    }
}

fn heading_of(line_or_text: &str) -> Option<String> {
    let first = line_or_text.lines().next()?;
    first
        .strip_prefix("## ")
        .map(|h| h.trim().to_string())
}

fn is_fence_toggle(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A parsed `profile.md`.
#[derive(Debug, Clone)]
pub struct StudentDocument {
    pub front_matter: FrontMatter,
    /// Text between the closing `---` and the first section.
    pub preamble: String,
    pub sections: Vec<Section>,
    /// Front matter as read, with its exact YAML text.
    original: Option<(FrontMatter, String)>,
}

impl StudentDocument {
    /// Assemble a fresh document; front matter will be serialized on output.
    pub fn new(front_matter: FrontMatter, preamble: String, sections: Vec<Section>) -> Self {
        StudentDocument {
            front_matter,
            preamble,
            sections,
            original: None,
        }
    }

    /// Parse a document. Line endings are normalised to LF first.
    pub fn parse(text: &str, catalog: &[Course]) -> Result<Self, DocumentError> {
        let text = text.trim_start_matches('\u{feff}').replace("\r\n", "\n");

        let mut lines = text.split_inclusive('\n');
        match lines.next() {
            Some(first) if first.trim_end() == FENCE => {}
            _ => return Err(DocumentError::MissingFrontMatter),
        }

        let mut offset = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
        let yaml_start = offset;
        let mut yaml_end = None;
        for line in lines {
            if line.trim_end() == FENCE {
                yaml_end = Some(offset);
                offset += line.len();
                break;
            }
            offset += line.len();
        }
        let yaml_end = yaml_end.ok_or(DocumentError::UnterminatedFrontMatter)?;
        let yaml = &text[yaml_start..yaml_end];

        let front_matter: FrontMatter = if yaml.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        let (preamble, sections) = split_sections(&text[offset..], catalog)?;
        Ok(StudentDocument {
            original: Some((front_matter.clone(), yaml.to_string())),
            front_matter,
            preamble,
            sections,
        })
    }

    /// Index of the practicum section for `code`.
    pub fn practicum_index(&self, code: &CourseCode) -> Option<usize> {
        self.sections.iter().position(|s| {
            matches!(&s.kind, SectionKind::Practicum { code: c, .. } if c == code)
        })
    }

    /// Course codes of the practicum sections, in document order.
    pub fn practicum_codes(&self) -> Vec<CourseCode> {
        self.sections
            .iter()
            .filter_map(|s| match &s.kind {
                SectionKind::Practicum { code, .. } => Some(code.clone()),
                _ => None,
            })
            .collect()
    }

    /// First section of the given kind.
    pub fn section(&self, kind: &SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| &s.kind == kind)
    }

    /// Insert a practicum section at its canonical position and return its index.
    ///
    /// Before the first practicum section with a higher sequence; otherwise
    /// after the last practicum section; otherwise before Contact; otherwise
    /// at the end.
    pub fn insert_practicum(&mut self, section: Section) -> usize {
        let sequence = match &section.kind {
            SectionKind::Practicum { sequence, .. } => *sequence,
            _ => u32::MAX,
        };
        let later = self.sections.iter().position(|s| {
            matches!(s.kind, SectionKind::Practicum { sequence: other, .. } if other > sequence)
        });
        let last_practicum = self
            .sections
            .iter()
            .rposition(|s| matches!(s.kind, SectionKind::Practicum { .. }));
        let contact = self
            .sections
            .iter()
            .position(|s| matches!(s.kind, SectionKind::Contact));

        let idx = later
            .or(last_practicum.map(|i| i + 1))
            .or(contact)
            .unwrap_or(self.sections.len());
        self.sections.insert(idx, section);
        idx
    }

    /// Serialize back to markdown.
    pub fn to_markdown(&self) -> Result<String, DocumentError> {
        let yaml = match &self.original {
            Some((fm, raw)) if *fm == self.front_matter => raw.clone(),
            _ => serde_yaml::to_string(&self.front_matter)?,
        };

        let mut out = String::with_capacity(yaml.len() + 1024);
        out.push_str(FENCE);
        out.push('\n');
        out.push_str(&yaml);
        if !yaml.is_empty() && !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(FENCE);
        out.push('\n');
        out.push_str(&self.preamble);
        for section in &self.sections {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&section.raw);
        }
        Ok(out)
    }
}

fn split_sections(
    body: &str,
    catalog: &[Course],
) -> Result<(String, Vec<Section>), DocumentError> {
    let mut preamble = String::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut in_fence = false;

    for line in body.split_inclusive('\n') {
        if is_fence_toggle(line) {
            in_fence = !in_fence;
        }
        let heading = if in_fence { None } else { heading_of(line) };
        match heading {
            Some(heading) => {
                if let Some((h, raw)) = current.take() {
                    sections.push(Section {
                        kind: SectionKind::classify(&h, catalog),
                        heading: h,
                        raw,
                    });
                }
                current = Some((heading, line.to_string()));
            }
            None => match current.as_mut() {
                Some((_, raw)) => raw.push_str(line),
                None => preamble.push_str(line),
            },
        }
    }
    if let Some((h, raw)) = current {
        sections.push(Section {
            kind: SectionKind::classify(&h, catalog),
            heading: h,
            raw,
        });
    }

    let mut seen = Vec::new();
    for section in &sections {
        if let SectionKind::Practicum { code, .. } = &section.kind {
            if seen.contains(code) {
                return Err(DocumentError::DuplicatePracticum(code.to_string()));
            }
            seen.push(code.clone());
        }
    }
    Ok((preamble, sections))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
