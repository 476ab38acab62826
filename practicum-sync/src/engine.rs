//! Roster sync engine: one [`RosterRecord`] in, one [`Outcome`] out.
//!
//! Every record is first turned into a [`Plan`] (pure, no writes), then the
//! plan is committed. `--dry-run` and `diff` stop after planning.
//!
//! ```text
//! no profile.md ──► render all sections ──► Created
//! profile.md ─┬─► unparseable / wrong username /
//!             │   unreadable provenance ──► Conflict (untouched)
//!             └─► practicum section for course?
//!                   ├─ Generated     → regenerate section
//!                   ├─ StudentEdited → patch title + link lines
//!                   └─ missing       → insert in sequence order
//!                 ──► Updated { changed }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use practicum_core::config::Config;
use practicum_core::store::README_FILE;
use practicum_core::types::{Course, CourseOffering, Provenance, RosterRecord, Username};
use practicum_core::{DocumentStore, Section, SectionKind, StudentDocument};
use practicum_renderer::{PracticumContext, ProfileContext, ReadmeContext, Renderer};
use practicum_roster::extract_tags;
use serde::Serialize;

use crate::error::SyncError;
use crate::hash_store::{self, ProvenanceFile};
use crate::merge;
use crate::writer::{atomic_write, WriteResult};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What happened to one roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A new student folder and profile were created.
    Created { username: Username, path: PathBuf },
    /// An existing profile was merged; `changed = false` means nothing was written.
    Updated {
        username: Username,
        path: PathBuf,
        changed: bool,
    },
    /// The row could not be turned into a record; nothing was touched.
    Skipped { line: usize, reason: String },
    /// The existing profile could not be merged safely and was left as is.
    Conflict {
        username: Username,
        path: PathBuf,
        reason: String,
    },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Created { .. } => "created",
            Outcome::Updated { changed: true, .. } => "updated",
            Outcome::Updated { changed: false, .. } => "unchanged",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Conflict { .. } => "conflict",
        }
    }

    pub fn username(&self) -> Option<&Username> {
        match self {
            Outcome::Created { username, .. }
            | Outcome::Updated { username, .. }
            | Outcome::Conflict { username, .. } => Some(username),
            Outcome::Skipped { .. } => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created { username, .. } => write!(f, "created {username}"),
            Outcome::Updated { username, changed: true, .. } => write!(f, "updated {username}"),
            Outcome::Updated { username, changed: false, .. } => {
                write!(f, "unchanged {username}")
            }
            Outcome::Skipped { line, reason } => write!(f, "skipped line {line}: {reason}"),
            Outcome::Conflict { username, reason, .. } => {
                write!(f, "conflict {username}: {reason}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanKind {
    Create,
    Update,
    Conflict(String),
}

/// Everything a sync of one record would change, computed without writing.
#[derive(Debug, Clone)]
pub struct Plan {
    pub username: Username,
    pub kind: PlanKind,
    pub profile_path: PathBuf,
    /// `profile.md` as currently on disk (LF-normalised).
    pub before: Option<String>,
    /// `profile.md` after the merge; `None` for conflicts.
    pub after: Option<String>,
    pub readme_path: PathBuf,
    /// Rendered `README.md`; `None` for conflicts.
    pub readme: Option<String>,
    provenance: ProvenanceFile,
    provenance_dirty: bool,
}

impl Plan {
    /// Whether `profile.md` would change.
    pub fn profile_changed(&self) -> bool {
        self.after.is_some() && self.after != self.before
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Merges roster records for one course offering into the document store.
pub struct SyncEngine<'a> {
    config: &'a Config,
    offering: CourseOffering,
    store: DocumentStore,
    state_dir: PathBuf,
    renderer: Renderer,
    dry_run: bool,
}

impl<'a> SyncEngine<'a> {
    /// Engine over the repository at `root`.
    pub fn new(
        root: &Path,
        config: &'a Config,
        offering: CourseOffering,
        dry_run: bool,
    ) -> Result<Self, SyncError> {
        let templates = config.templates_dir_at(root);
        Ok(SyncEngine {
            config,
            offering,
            store: DocumentStore::new(config.students_dir_at(root)),
            state_dir: config.state_dir_at(root),
            renderer: Renderer::with_overrides(templates.as_deref())?,
            dry_run,
        })
    }

    pub fn offering(&self) -> &CourseOffering {
        &self.offering
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Plan and (unless dry-run) commit the sync of one record.
    pub fn sync(&self, record: &RosterRecord) -> Result<Outcome, SyncError> {
        let plan = self.plan(record)?;
        let username = plan.username.clone();
        let path = plan.profile_path.clone();

        if let PlanKind::Conflict(reason) = &plan.kind {
            tracing::warn!(%username, path = %path.display(), "conflict: {reason}");
            return Ok(Outcome::Conflict {
                username,
                path,
                reason: reason.clone(),
            });
        }

        let created = plan.kind == PlanKind::Create;
        let changed = self.commit(plan)?;

        Ok(if created {
            Outcome::Created { username, path }
        } else {
            Outcome::Updated {
                username,
                path,
                changed,
            }
        })
    }

    /// Work out what syncing `record` would do, without touching disk.
    pub fn plan(&self, record: &RosterRecord) -> Result<Plan, SyncError> {
        let username = record.username.clone();
        let profile_path = self.store.profile_path(&username);
        let readme_path = self.store.readme_path(&username);
        let before = self
            .store
            .read_profile(&username)?
            .map(|t| t.trim_start_matches('\u{feff}').replace("\r\n", "\n"));
        let loaded = hash_store::load_at(&self.state_dir, &username);

        let conflict = |reason: String| Plan {
            username: username.clone(),
            kind: PlanKind::Conflict(reason),
            profile_path: profile_path.clone(),
            before: before.clone(),
            after: None,
            readme_path: readme_path.clone(),
            readme: None,
            provenance: ProvenanceFile::default(),
            provenance_dirty: false,
        };

        // A damaged provenance file cannot tell generated text from student
        // text; leave the student alone until it is repaired or removed.
        let mut provenance = match loaded {
            Ok(provenance) => provenance,
            Err(e @ SyncError::Json { .. }) => {
                return Ok(conflict(format!("provenance store unreadable: {e}")));
            }
            Err(e) => return Err(e),
        };

        let (kind, doc, provenance_dirty) = match &before {
            None => {
                let doc = self.new_document(record, &mut provenance)?;
                (PlanKind::Create, doc, true)
            }
            Some(text) => {
                let mut doc = match StudentDocument::parse(text, &self.config.courses) {
                    Ok(doc) => doc,
                    Err(e) => return Ok(conflict(e.to_string())),
                };
                let owner = doc.front_matter.username.trim();
                if !owner.is_empty() && Username::slug(owner).as_ref() != Some(&username) {
                    return Ok(conflict(format!(
                        "front matter username '{owner}' does not match folder '{username}'"
                    )));
                }
                let dirty = self.merge_into(&mut doc, record, &mut provenance)?;
                (PlanKind::Update, doc, dirty)
            }
        };

        let after = doc.to_markdown()?;
        let readme = self.render_readme(&doc, record)?;

        Ok(Plan {
            username,
            kind,
            profile_path,
            before,
            after: Some(after),
            readme_path,
            readme: Some(readme),
            provenance,
            provenance_dirty,
        })
    }

    fn commit(&self, mut plan: Plan) -> Result<bool, SyncError> {
        let profile_changed = plan.profile_changed();
        if self.dry_run {
            let readme_changes = match &plan.readme {
                Some(readme) => plan.provenance.files.get(README_FILE)
                    != Some(&hash_store::digest(readme))
                    || !plan.readme_path.exists(),
                None => false,
            };
            return Ok(profile_changed || readme_changes);
        }

        self.store.provision(&plan.username)?;
        if profile_changed {
            if let Some(after) = &plan.after {
                self.store.save_profile(&plan.username, after)?;
                tracing::info!(username = %plan.username, "wrote: {}", plan.profile_path.display());
            }
        } else {
            tracing::debug!(username = %plan.username, "unchanged: {}", plan.profile_path.display());
        }

        let mut readme_written = false;
        if let Some(readme) = &plan.readme {
            let result = atomic_write(
                &plan.readme_path,
                README_FILE,
                readme,
                &mut plan.provenance.files,
                false,
            )?;
            readme_written = matches!(result, WriteResult::Written { .. });
        }

        if plan.provenance_dirty || readme_written {
            plan.provenance.synced_at = Some(chrono::Utc::now());
            hash_store::save_at(&self.state_dir, &plan.username, &plan.provenance)?;
        }
        Ok(profile_changed || readme_written)
    }

    // -----------------------------------------------------------------------
    // Document building
    // -----------------------------------------------------------------------

    fn new_document(
        &self,
        record: &RosterRecord,
        provenance: &mut ProvenanceFile,
    ) -> Result<StudentDocument, SyncError> {
        let profile = ProfileContext::new(record, &self.config.institution);
        let sections = vec![
            Section::new(SectionKind::AboutMe, self.renderer.about_me(&profile)?),
            Section::new(SectionKind::Skills, self.renderer.skills(&profile)?),
            self.practicum_section(record)?,
            Section::new(SectionKind::Contact, self.renderer.contact(&profile)?),
        ];

        // A stale store from a deleted profile must not vouch for new text.
        provenance.sections.clear();
        for section in &sections {
            provenance.record(section);
        }

        let front_matter = merge::new_front_matter(record, &self.offering, self.config);
        Ok(StudentDocument::new(front_matter, "\n".to_string(), sections))
    }

    /// Returns whether the provenance store changed.
    fn merge_into(
        &self,
        doc: &mut StudentDocument,
        record: &RosterRecord,
        provenance: &mut ProvenanceFile,
    ) -> Result<bool, SyncError> {
        let code = &self.offering.course.code;
        let mut dirty = false;

        match doc.practicum_index(code) {
            Some(idx) => {
                let existing = &doc.sections[idx];
                match provenance.provenance(existing) {
                    Provenance::Generated => {
                        let fresh = self.practicum_section(record)?;
                        if fresh.raw != existing.raw {
                            provenance.record(&fresh);
                            doc.sections[idx] = fresh;
                            dirty = true;
                        }
                    }
                    Provenance::StudentEdited => {
                        doc.sections[idx].raw = merge::patch_practicum(&existing.raw, record);
                    }
                }
            }
            None => {
                let fresh = self.practicum_section(record)?;
                provenance.record(&fresh);
                doc.insert_practicum(fresh);
                dirty = true;
            }
        }

        merge::apply_offering(doc, &self.offering, self.config);
        Ok(dirty)
    }

    fn practicum_section(&self, record: &RosterRecord) -> Result<Section, SyncError> {
        let course = &self.offering.course;
        let ctx = PracticumContext::new(record, course, extract_tags(&record.project_title));
        Ok(Section::new(
            SectionKind::Practicum {
                code: course.code.clone(),
                sequence: course.sequence,
            },
            self.renderer.practicum(&ctx)?,
        ))
    }

    fn render_readme(
        &self,
        doc: &StudentDocument,
        record: &RosterRecord,
    ) -> Result<String, SyncError> {
        let fm = &doc.front_matter;
        let mut courses: Vec<&Course> = fm
            .courses
            .iter()
            .filter_map(|c| self.config.course(&c.code))
            .collect();
        if courses.is_empty() {
            courses.push(&self.offering.course);
        }
        courses.sort_by_key(|c| c.sequence);
        let name = if fm.name.trim().is_empty() {
            record.full_name.as_str()
        } else {
            fm.name.as_str()
        };
        let ctx = ReadmeContext::new(name, record.username.as_str(), &courses);
        Ok(self.renderer.readme(&ctx)?)
    }
}
