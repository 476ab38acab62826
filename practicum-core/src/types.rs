//! Domain types for the practicum roster and student documents.
//!
//! All types are serializable/deserializable via serde + serde_yaml.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable, unique key of a student across every roster and course.
///
/// Always stored in slug form: lowercase, no `#`, no surrounding whitespace,
/// inner whitespace collapsed to `-`. A slug is a single path component: it
/// never contains `/`, `\`, `..` or control characters and never starts with `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Username(pub String);

impl Username {
    /// Build a slugged username. Returns `None` when nothing usable is left
    /// or the result could not name a folder of its own.
    pub fn slug(raw: &str) -> Option<Self> {
        let cleaned: String = raw.replace('#', "");
        let slug = cleaned
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        if slug.is_empty() || !Self::is_path_safe(&slug) {
            None
        } else {
            Some(Self(slug))
        }
    }

    /// Whether `name` is usable as one path component under the store root.
    pub fn is_path_safe(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('.')
            && !name.contains("..")
            && !name.contains(['/', '\\', ':'])
            && !name.chars().any(char::is_control)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Canonical course code: uppercase, no spaces (`MSDS692`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CourseCode(pub String);

impl CourseCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CourseCode {
    fn from(s: &str) -> Self {
        Self(
            s.chars()
                .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
                .collect::<String>()
                .to_uppercase(),
        )
    }
}

impl From<String> for CourseCode {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<CourseCode> for String {
    fn from(c: CourseCode) -> Self {
        c.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Semester
// ---------------------------------------------------------------------------

/// Academic term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Spring => write!(f, "Spring"),
            Term::Summer => write!(f, "Summer"),
            Term::Fall => write!(f, "Fall"),
            Term::Winter => write!(f, "Winter"),
        }
    }
}

impl FromStr for Term {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Term::Spring),
            "summer" => Ok(Term::Summer),
            "fall" | "autumn" => Ok(Term::Fall),
            "winter" => Ok(Term::Winter),
            other => Err(ParseValueError::Term(other.to_string())),
        }
    }
}

/// A term in a given year, displayed as `Summer 2025`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Semester {
    pub term: Term,
    pub year: u16,
}

impl Semester {
    /// Folder/file friendly form: `summer2025`.
    pub fn slug(&self) -> String {
        format!("{}{}", self.term.to_string().to_lowercase(), self.year)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term, self.year)
    }
}

impl FromStr for Semester {
    type Err = ParseValueError;

    /// Accepts `Summer 2025`, `Summer2025`, `summer-2025`, `2025 Summer`, `2025_summer`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();
        let letters: String = compact.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        let digits: String = compact.chars().filter(|c| c.is_ascii_digit()).collect();
        let well_formed = compact.len() == letters.len() + digits.len()
            && (compact.starts_with(letters.as_str()) || compact.ends_with(letters.as_str()));
        if !well_formed || digits.len() != 4 {
            return Err(ParseValueError::Semester(s.to_string()));
        }
        let term = letters
            .parse::<Term>()
            .map_err(|_| ParseValueError::Semester(s.to_string()))?;
        let year = digits
            .parse::<u16>()
            .map_err(|_| ParseValueError::Semester(s.to_string()))?;
        Ok(Semester { term, year })
    }
}

// ---------------------------------------------------------------------------
// Course catalog
// ---------------------------------------------------------------------------

/// One course of the program, as configured in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Canonical code, e.g. `MSDS692`.
    pub code: CourseCode,
    /// Human form used in headings and front matter, e.g. `MSDS 692`.
    pub display: String,
    /// Practicum numeral, e.g. `I` or `II`.
    pub label: String,
    /// Position in the program; sections are ordered by this.
    pub sequence: u32,
}

impl Course {
    /// Heading text of this course's practicum section.
    pub fn section_heading(&self) -> String {
        format!("{} - Practicum {}", self.display, self.label)
    }

    /// Whether a `## ` heading names this course.
    ///
    /// Matches the display form (`MSDS 692`), the code (`MSDS692`), or the
    /// exact numeral after the word `practicum` (`Practicum I` but not
    /// `Practicum II`).
    pub fn matches_heading(&self, heading: &str) -> bool {
        let lower = heading.to_lowercase();
        if lower.contains(&self.display.to_lowercase())
            || lower.contains(&self.code.0.to_lowercase())
        {
            return true;
        }
        let label = self.label.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        words
            .windows(2)
            .any(|pair| pair[0] == "practicum" && pair[1] == label)
    }
}

/// A course taught in a specific semester: the unit one roster CSV covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub course: Course,
    pub semester: Semester,
}

impl CourseOffering {
    /// `msds692_summer2025`
    pub fn slug(&self) -> String {
        format!("{}_{}", self.course.code.0.to_lowercase(), self.semester.slug())
    }
}

impl fmt::Display for CourseOffering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.course.display, self.semester)
    }
}

// ---------------------------------------------------------------------------
// Roster records
// ---------------------------------------------------------------------------

/// Optional per-project links supplied by the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_page: Option<String>,
}

impl ProjectLinks {
    pub fn is_empty(&self) -> bool {
        self.github.is_none()
            && self.presentation.is_none()
            && self.report.is_none()
            && self.profile_page.is_none()
    }
}

/// One normalized roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    /// 1-based line number in the source CSV (header is line 1).
    pub line: usize,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    /// Email after domain rewriting.
    pub email: String,
    pub username: Username,
    pub project_title: String,
    pub links: ProjectLinks,
}

/// Who last authored a section of a student document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Still exactly what the generator wrote.
    Generated,
    /// Changed by hand, or of unknown origin.
    StudentEdited,
}

impl Provenance {
    pub fn is_placeholder(self) -> bool {
        matches!(self, Provenance::Generated)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
