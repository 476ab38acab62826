//! Turn raw CSV rows into [`RosterRecord`]s.

use practicum_core::config::{Config, EmailRules};
use practicum_core::types::{ProjectLinks, RosterRecord, Username};
use thiserror::Error;

use crate::ingest::RosterRow;

/// Title used when the roster leaves `Project Title` empty.
pub const UNTITLED_PROJECT: &str = "Untitled Project";

/// Why a row was not turned into a record. Rejected rows are skipped, not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("row has no student name")]
    MissingName,

    #[error("row has no username")]
    MissingUsername,

    #[error("username '{0}' cannot name a student folder")]
    InvalidUsername(String),

    #[error("username '{username}' matches excluded pattern '{pattern}'")]
    ExcludedUsername { username: String, pattern: String },
}

/// Normalize one row: split the name, rewrite the email domain, slug the username.
///
/// Every cell ends up on a single line; embedded line breaks are collapsed to
/// spaces so no cell can start a line of its own in a rendered profile.
pub fn normalize(row: &RosterRow, config: &Config) -> Result<RosterRecord, Rejection> {
    let (full_name, first_name, last_name) = resolve_name(row).ok_or(Rejection::MissingName)?;
    let email = normalize_email(&row.email, &config.email);

    let username = match Username::slug(&row.username) {
        Some(u) => u,
        None if !row.username.replace('#', "").trim().is_empty() => {
            return Err(Rejection::InvalidUsername(row.username.trim().to_string()));
        }
        None if config.roster.derive_username_from_email => email
            .rsplit_once('@')
            .and_then(|(local, _)| Username::slug(local))
            .ok_or(Rejection::MissingUsername)?,
        None => return Err(Rejection::MissingUsername),
    };

    if let Some(pattern) = config
        .roster
        .excluded_username_patterns
        .iter()
        .find(|p| !p.is_empty() && username.as_str().contains(&p.to_lowercase()))
    {
        return Err(Rejection::ExcludedUsername {
            username: username.to_string(),
            pattern: pattern.clone(),
        });
    }

    let project_title = match collapse(&row.project_title) {
        title if title.is_empty() => UNTITLED_PROJECT.to_string(),
        title => title,
    };

    Ok(RosterRecord {
        line: row.line,
        full_name,
        first_name,
        last_name,
        email,
        username,
        project_title,
        links: ProjectLinks {
            github: link(&row.github),
            presentation: link(&row.presentation),
            report: link(&row.report),
            profile_page: link(&row.profile_page),
        },
    })
}

/// `(full, first, last)`; `None` when the row carries no name at all.
fn resolve_name(row: &RosterRow) -> Option<(String, String, String)> {
    let full = collapse(&row.student_name);
    if !full.is_empty() {
        let (first, last) = split_name(&full);
        return Some((full, first, last));
    }
    let first = collapse(&row.first_name);
    let last = collapse(&row.last_name);
    let full = collapse(&format!("{first} {last}"));
    if full.is_empty() {
        None
    } else {
        Some((full, first, last))
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First whitespace-separated token is the first name; the rest is the last name.
pub fn split_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Lowercase the domain and apply the first matching rewrite.
///
/// Whitespace is dropped; values without an `@` are otherwise untouched.
pub fn normalize_email(raw: &str, rules: &EmailRules) -> String {
    let raw: String = raw.split_whitespace().collect();
    let raw = raw.as_str();
    let Some((local, domain)) = raw.rsplit_once('@') else {
        return raw.to_string();
    };
    let domain = domain.to_lowercase();
    let domain = rules
        .rewrites
        .iter()
        .find(|r| r.from.eq_ignore_ascii_case(&domain))
        .map(|r| r.to.to_lowercase())
        .unwrap_or(domain);
    format!("{local}@{domain}")
}

/// Empty cells and `#` placeholders carry no link.
fn link(raw: &str) -> Option<String> {
    let v = collapse(raw);
    if v.is_empty() || v == "#" {
        None
    } else {
        Some(v)
    }
}
