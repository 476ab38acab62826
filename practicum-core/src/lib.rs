//! Practicum core library — domain types, configuration, student documents
//! and the document store.
//!
//! - [`types`] — newtypes, course catalog and roster records
//! - [`config`] — `practicum.yaml`
//! - [`document`] — front matter + section model of `profile.md`
//! - [`store`] — load / atomic save of student folders
//! - [`error`] — error enums

pub mod config;
pub mod document;
pub mod error;
pub mod store;
pub mod types;

pub use config::Config;
pub use document::{CourseEntry, FrontMatter, Section, SectionKind, StudentDocument};
pub use error::{ConfigError, DocumentError, ParseValueError, StoreError};
pub use store::DocumentStore;
pub use types::{
    Course, CourseCode, CourseOffering, ProjectLinks, Provenance, RosterRecord, Semester, Term,
    Username,
};
