//! Section-level merge rules.
//!
//! Pure functions over document text and front matter; the engine decides
//! when to call them based on provenance.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use practicum_core::config::Config;
use practicum_core::types::{CourseCode, CourseOffering, RosterRecord};
use practicum_core::{CourseEntry, FrontMatter, SectionKind, StudentDocument};

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\*Title:\*\*[^\n]*$").expect("title pattern"));

static GITHUB_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^([ \t]*[-*+][ \t]*github[^:\n]*:[ \t]*)\[([^\]\n]*)\]\([^)\n]*\)")
        .expect("github pattern")
});

static REPORT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^([ \t]*[-*+][ \t]*(?:project[ \t]+)?report[^:\n]*:[ \t]*)\[([^\]\n]*)\]\([^)\n]*\)",
    )
    .expect("report pattern")
});

static SLIDES_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^([ \t]*[-*+][ \t]*(?:presentation|slides)[^:\n]*:[ \t]*)\[([^\]\n]*)\]\([^)\n]*\)",
    )
    .expect("slides pattern")
});

/// Link text the generator uses before a GitHub URL is known.
pub const GITHUB_PLACEHOLDER: &str = "Add your GitHub link";

/// Refresh a student-edited practicum section from the roster.
///
/// Only the `**Title:**` line and the GitHub / report / slides link lines for
/// which `record` has a URL are touched; every other byte is kept. Link text
/// is kept unless it is the generator's GitHub placeholder.
pub fn patch_practicum(raw: &str, record: &RosterRecord) -> String {
    let title = format!("**Title:** {}", record.project_title);
    let mut out = TITLE_LINE
        .replace(raw, regex::NoExpand(&title))
        .into_owned();

    if let Some(url) = &record.links.github {
        out = replace_link(&GITHUB_LINK, &out, url, |text| {
            if text == GITHUB_PLACEHOLDER {
                url.clone()
            } else {
                text.to_string()
            }
        });
    }
    if let Some(url) = &record.links.report {
        out = replace_link(&REPORT_LINK, &out, url, str::to_string);
    }
    if let Some(url) = &record.links.presentation {
        out = replace_link(&SLIDES_LINK, &out, url, str::to_string);
    }
    out
}

fn replace_link(
    pattern: &Regex,
    text: &str,
    url: &str,
    link_text: impl Fn(&str) -> String,
) -> String {
    pattern
        .replace(text, |caps: &Captures| {
            format!("{}[{}]({})", &caps[1], link_text(&caps[2]), url)
        })
        .into_owned()
}

/// Value of a `**Label:** value` line, if present and non-empty.
pub fn read_field(raw: &str, label: &str) -> Option<String> {
    let prefix = format!("**{label}:**");
    raw.lines()
        .find_map(|line| line.trim_start().strip_prefix(prefix.as_str()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Front matter for a student seen for the first time.
pub fn new_front_matter(
    record: &RosterRecord,
    offering: &CourseOffering,
    config: &Config,
) -> FrontMatter {
    FrontMatter {
        name: record.full_name.clone(),
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        email: record.email.clone(),
        username: record.username.to_string(),
        links: record.links.clone(),
        course: offering.course.display.clone(),
        semester: offering.semester.to_string(),
        graduation: format!("May {}", offering.semester.year + 1),
        major: config.institution.major.clone(),
        degree: config.institution.degree.clone(),
        university: config.institution.university.clone(),
        courses: vec![course_entry(offering)],
        ..FrontMatter::default()
    }
}

fn course_entry(offering: &CourseOffering) -> CourseEntry {
    CourseEntry {
        code: offering.course.code.clone(),
        course: offering.course.display.clone(),
        semester: offering.semester.to_string(),
    }
}

/// Record `offering` in front matter `courses` and point `course`/`semester`
/// at the highest-sequence course.
///
/// `courses` is kept in catalog sequence; re-importing a course replaces its
/// entry. When the document holds a practicum section for a later course that
/// `courses` does not list, `course`/`semester` are left alone.
pub fn apply_offering(doc: &mut StudentDocument, offering: &CourseOffering, config: &Config) {
    let sequence_of = |code: &CourseCode| config.course(code).map(|c| c.sequence);

    let entry = course_entry(offering);
    let courses = &mut doc.front_matter.courses;
    match courses.iter_mut().find(|c| c.code == entry.code) {
        Some(existing) => *existing = entry,
        None => courses.push(entry),
    }
    courses.sort_by_key(|c| sequence_of(&c.code).unwrap_or(u32::MAX));

    let latest = courses
        .iter()
        .filter_map(|c| sequence_of(&c.code).map(|seq| (seq, c)))
        .max_by_key(|(seq, _)| *seq);
    let highest_section = doc
        .sections
        .iter()
        .filter_map(|s| match s.kind {
            SectionKind::Practicum { sequence, .. } => Some(sequence),
            _ => None,
        })
        .max();

    if let Some((seq, entry)) = latest {
        if highest_section.map_or(true, |h| seq >= h) {
            let (course, semester) = (entry.course.clone(), entry.semester.clone());
            doc.front_matter.course = course;
            doc.front_matter.semester = semester;
        }
    }
}
