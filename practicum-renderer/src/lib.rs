//! # practicum-renderer
//!
//! Tera-based rendering of everything the generator writes: the sections of
//! a new `profile.md`, the per-student `README.md`, and the published HTML
//! profile page.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use practicum_core::{Config, CourseCode, RosterRecord};
//! use practicum_renderer::{PracticumContext, Renderer};
//!
//! fn render_section(record: &RosterRecord, config: &Config) {
//!     let Some(course) = config.course(&CourseCode::from("MSDS692")) else { return };
//!     if let Ok(renderer) = Renderer::new() {
//!         let ctx = PracticumContext::new(record, course, vec!["Python".into()]);
//!         if let Ok(section) = renderer.practicum(&ctx) {
//!             print!("{section}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod markdown;

pub use context::{
    CourseFiles, LinkCtx, PageContext, PageCourse, PageSection, PracticumContext, ProfileContext,
    ReadmeContext,
};
pub use engine::{Renderer, TemplateEngine, TemplateKind};
pub use error::RenderError;
