//! Roster ingest for the practicum sync engine.
//!
//! - [`ingest`] — CSV reading and header matching
//! - [`normalize`] — rows to [`RosterRecord`]s (name split, email rewrite, username slug)
//! - [`offering`] — course + semester a roster covers
//! - [`tags`] — project tags from the title

pub mod error;
pub mod ingest;
pub mod normalize;
pub mod offering;
pub mod tags;

pub use error::RosterError;
pub use ingest::{read_roster, read_roster_from, RosterRow};
pub use normalize::{normalize, normalize_email, split_name, Rejection};
pub use offering::resolve_offering;
pub use tags::extract_tags;

pub use practicum_core::types::RosterRecord;
