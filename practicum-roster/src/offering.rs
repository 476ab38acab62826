//! Course offering resolution.
//!
//! A roster row never says which course it belongs to. The offering comes
//! from explicit run parameters or, failing that, from the CSV file stem:
//!
//! ```text
//! 2025_Summer_MSDS692.csv   -> MSDS692, Summer 2025
//! MSDS696_Fall2025.csv      -> MSDS696, Fall 2025
//! msds-692 summer-2025.csv  -> MSDS692, Summer 2025
//! ```

use std::path::Path;

use practicum_core::config::Config;
use practicum_core::types::{Course, CourseCode, CourseOffering, Semester};

use crate::error::RosterError;

/// Resolve the offering a roster covers. Explicit values win over the file name.
pub fn resolve_offering(
    csv_path: &Path,
    course: Option<&str>,
    semester: Option<&str>,
    config: &Config,
) -> Result<CourseOffering, RosterError> {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tokens = tokenize(&stem);

    let course = match course {
        Some(raw) => lookup(config, raw)?.clone(),
        None => course_from_tokens(&tokens, config)?.ok_or_else(|| RosterError::MissingCourse {
            path: csv_path.to_path_buf(),
        })?,
    };

    let semester = match semester {
        Some(raw) => raw.parse::<Semester>()?,
        None => semester_from_tokens(&tokens).ok_or_else(|| RosterError::MissingSemester {
            path: csv_path.to_path_buf(),
        })?,
    };

    tracing::debug!(course = %course.code, %semester, "resolved course offering");
    Ok(CourseOffering { course, semester })
}

fn lookup<'a>(config: &'a Config, raw: &str) -> Result<&'a Course, RosterError> {
    let code = CourseCode::from(raw);
    config
        .course(&code)
        .ok_or_else(|| RosterError::UnknownCourse(code.to_string()))
}

fn tokenize(stem: &str) -> Vec<String> {
    stem.split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Single tokens first, then adjacent pairs (`msds` + `692`).
fn candidates(tokens: &[String]) -> impl Iterator<Item = String> + '_ {
    tokens
        .iter()
        .cloned()
        .chain(tokens.windows(2).map(|w| format!("{}{}", w[0], w[1])))
}

/// Letters followed by digits, e.g. `MSDS692`.
fn looks_like_course_code(token: &str) -> bool {
    let letters = token.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let digits = token[letters..].chars().filter(|c| c.is_ascii_digit()).count();
    letters >= 2 && digits >= 3 && letters + digits == token.len()
}

fn course_from_tokens(tokens: &[String], config: &Config) -> Result<Option<Course>, RosterError> {
    let mut unknown = None;
    for candidate in candidates(tokens) {
        if let Some(course) = config.course(&CourseCode::from(candidate.as_str())) {
            return Ok(Some(course.clone()));
        }
        if unknown.is_none() && looks_like_course_code(&candidate) {
            unknown = Some(CourseCode::from(candidate.as_str()).to_string());
        }
    }
    match unknown {
        Some(code) => Err(RosterError::UnknownCourse(code)),
        None => Ok(None),
    }
}

fn semester_from_tokens(tokens: &[String]) -> Option<Semester> {
    candidates(tokens).find_map(|c| c.parse::<Semester>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use practicum_core::types::Term;

    fn resolve(name: &str) -> Result<CourseOffering, RosterError> {
        resolve_offering(Path::new(name), None, None, &Config::default())
    }

    #[test]
    fn parses_year_term_course_filenames() {
        let offering = resolve("rosters/2025_Summer_MSDS692.csv").unwrap();
        assert_eq!(offering.course.code.as_str(), "MSDS692");
        assert_eq!(offering.semester, Semester { term: Term::Summer, year: 2025 });
    }

    #[test]
    fn parses_course_first_filenames() {
        let offering = resolve("MSDS696_Fall2025.csv").unwrap();
        assert_eq!(offering.course.label, "II");
        assert_eq!(offering.semester.to_string(), "Fall 2025");
    }

    #[test]
    fn parses_split_course_code() {
        let offering = resolve("msds-692 summer-2025.csv").unwrap();
        assert_eq!(offering.slug(), "msds692_summer2025");
    }

    #[test]
    fn explicit_values_override_filename() {
        let offering = resolve_offering(
            Path::new("2025_Summer_MSDS692.csv"),
            Some("msds 696"),
            Some("Fall 2025"),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(offering.course.code.as_str(), "MSDS696");
        assert_eq!(offering.semester.term, Term::Fall);
    }

    #[test]
    fn unknown_course_is_an_error() {
        assert!(matches!(
            resolve("2025_Summer_MSDS999.csv"),
            Err(RosterError::UnknownCourse(code)) if code == "MSDS999"
        ));
        let err = resolve_offering(
            Path::new("roster.csv"),
            Some("CS101"),
            Some("Fall 2025"),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::UnknownCourse(_)));
    }

    #[test]
    fn missing_parts_are_reported() {
        assert!(matches!(resolve("roster.csv"), Err(RosterError::MissingCourse { .. })));
        assert!(matches!(
            resolve("MSDS692_roster.csv"),
            Err(RosterError::MissingSemester { .. })
        ));
    }
}
