//! # practicum-sync
//!
//! Roster sync and merge engine, plus the outputs built on top of it.
//!
//! - [`pipeline::run`] syncs one roster CSV into the student store
//! - [`diff::diff_roster`] shows what such a run would change
//! - [`publish::publish`] renders the static site and course indexes
//! - [`status::student_statuses`] reports section provenance per student

pub mod diff;
pub mod engine;
pub mod error;
pub mod hash_store;
pub mod merge;
pub mod pipeline;
pub mod publish;
pub mod status;
pub mod writer;

pub use diff::{diff_roster, DiffReport, FileDiff};
pub use engine::{Outcome, Plan, PlanKind, SyncEngine};
pub use error::SyncError;
pub use hash_store::ProvenanceFile;
pub use pipeline::{run, OutcomeCounts, RunOptions, RunReport, RunSummary};
pub use publish::{publish, CourseIndex, PublishReport};
pub use status::{student_statuses, SectionStatus, StudentStatus};
pub use writer::{atomic_write, WriteResult};
