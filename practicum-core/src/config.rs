//! Run configuration, read from `<root>/practicum.yaml`.
//!
//! Every field has a default, so a missing file (or an empty one) yields the
//! stock Regis University data-science practicum setup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Course, CourseCode};

/// File name looked up at the repository root.
pub const CONFIG_FILE: &str = "practicum.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where student folders live, relative to the root.
    pub students_dir: PathBuf,
    /// Where `render` writes the site, relative to the root.
    pub site_dir: PathBuf,
    /// Engine bookkeeping (provenance hashes, run summaries).
    pub state_dir: PathBuf,
    /// Optional directory of `.tera` files overriding the embedded templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    pub email: EmailRules,
    pub institution: Institution,
    pub courses: Vec<Course>,
    pub roster: RosterRules,
    pub site: SiteSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            students_dir: PathBuf::from("data").join("students"),
            site_dir: PathBuf::from("site"),
            state_dir: PathBuf::from(".practicum"),
            templates_dir: None,
            email: EmailRules::default(),
            institution: Institution::default(),
            courses: default_courses(),
            roster: RosterRules::default(),
            site: SiteSettings::default(),
        }
    }
}

/// Domain substitutions applied to roster emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRules {
    pub rewrites: Vec<DomainRewrite>,
}

impl Default for EmailRules {
    fn default() -> Self {
        EmailRules {
            rewrites: vec![DomainRewrite {
                from: "worldclass.regis.edu".to_string(),
                to: "regis.edu".to_string(),
            }],
        }
    }
}

/// Rewrite `user@<from>` to `user@<to>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRewrite {
    pub from: String,
    pub to: String,
}

/// Program facts copied into every new profile's front matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Institution {
    pub university: String,
    pub degree: String,
    pub major: String,
}

impl Default for Institution {
    fn default() -> Self {
        Institution {
            university: "Regis University".to_string(),
            degree: "Master of Science in Data Science".to_string(),
            major: "Data Science".to_string(),
        }
    }
}

/// Row-level filtering rules for roster ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    /// Case-insensitive substrings; matching usernames are skipped.
    pub excluded_username_patterns: Vec<String>,
    /// Fall back to the email local part when the username cell is empty.
    pub derive_username_from_email: bool,
}

impl Default for RosterRules {
    fn default() -> Self {
        RosterRules {
            excluded_username_patterns: vec!["demo".to_string()],
            derive_username_from_email: false,
        }
    }
}

/// Settings for the rendered site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Prefix for profile page links in course indexes; relative links when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_courses() -> Vec<Course> {
    vec![
        Course {
            code: CourseCode::from("MSDS692"),
            display: "MSDS 692".to_string(),
            label: "I".to_string(),
            sequence: 1,
        },
        Course {
            code: CourseCode::from("MSDS696"),
            display: "MSDS 696".to_string(),
            label: "II".to_string(),
            sequence: 2,
        },
    ]
}

impl Config {
    /// `<root>/practicum.yaml` — pure, no I/O.
    pub fn path_at(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load the config under `root`, falling back to defaults when absent.
    pub fn load_at(root: &Path) -> Result<Config, ConfigError> {
        let path = Self::path_at(root);
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|source| ConfigError::Parse { path, source })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Write the default config to `<root>/practicum.yaml` if absent.
    ///
    /// Returns `true` when a file was created.
    pub fn init_at(root: &Path) -> Result<bool, ConfigError> {
        let path = Self::path_at(root);
        if path.exists() {
            return Ok(false);
        }
        let yaml = serde_yaml::to_string(&Config::default())?;
        let tmp = path.with_file_name(format!("{CONFIG_FILE}.tmp"));
        std::fs::write(&tmp, yaml).map_err(|source| ConfigError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(true)
    }

    /// `<root>/<students_dir>`
    pub fn students_dir_at(&self, root: &Path) -> PathBuf {
        root.join(&self.students_dir)
    }

    /// `<root>/<state_dir>`
    pub fn state_dir_at(&self, root: &Path) -> PathBuf {
        root.join(&self.state_dir)
    }

    /// `<root>/<site_dir>`
    pub fn site_dir_at(&self, root: &Path) -> PathBuf {
        root.join(&self.site_dir)
    }

    /// `<root>/<templates_dir>`, when configured.
    pub fn templates_dir_at(&self, root: &Path) -> Option<PathBuf> {
        self.templates_dir.as_ref().map(|d| root.join(d))
    }

    /// Catalog entry for `code`, if configured.
    pub fn course(&self, code: &CourseCode) -> Option<&Course> {
        self.courses.iter().find(|c| &c.code == code)
    }

    /// Catalog sorted by sequence.
    pub fn courses_in_sequence(&self) -> Vec<&Course> {
        let mut courses: Vec<&Course> = self.courses.iter().collect();
        courses.sort_by_key(|c| c.sequence);
        courses
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut codes = HashSet::new();
        let mut sequences = HashSet::new();
        for course in &self.courses {
            if !codes.insert(course.code.clone()) {
                return Err(ConfigError::Catalog(format!(
                    "course code {} listed twice",
                    course.code
                )));
            }
            if !sequences.insert(course.sequence) {
                return Err(ConfigError::Catalog(format!(
                    "sequence {} used by more than one course",
                    course.sequence
                )));
            }
        }
        Ok(())
    }
}
