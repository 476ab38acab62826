//! Tera rendering engine — [`TemplateKind`] enum and [`Renderer`].
//!
//! # Templates
//!
//! | Kind        | Template name                | Output                          |
//! |-------------|------------------------------|---------------------------------|
//! | AboutMe     | `profile/about.md.tera`      | `## About Me` section           |
//! | Skills      | `profile/skills.md.tera`     | `## Skills` section             |
//! | Practicum   | `profile/practicum.md.tera`  | one course's practicum section  |
//! | Contact     | `profile/contact.md.tera`    | `## Contact` section            |
//! | Readme      | `student/readme.md.tera`     | `<username>/README.md`          |
//! | ProfilePage | `site/profile.html.tera`     | `site/profiles/<username>.html` |
//!
//! A `templates_dir` may shadow any of these by relative path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Tera;

use crate::context::{
    to_tera_context, PageContext, PracticumContext, ProfileContext, ReadmeContext,
};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates — baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("profile/about.md.tera", include_str!("templates/profile/about.md.tera")),
    ("profile/skills.md.tera", include_str!("templates/profile/skills.md.tera")),
    (
        "profile/practicum.md.tera",
        include_str!("templates/profile/practicum.md.tera"),
    ),
    ("profile/contact.md.tera", include_str!("templates/profile/contact.md.tera")),
    ("student/readme.md.tera", include_str!("templates/student/readme.md.tera")),
    ("site/profile.html.tera", include_str!("templates/site/profile.html.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    // Markdown output must not be HTML-escaped; the page template escapes explicitly.
    tera.autoescape_on(vec![]);
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// Every template the generator renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    AboutMe,
    Skills,
    Practicum,
    Contact,
    Readme,
    ProfilePage,
}

impl TemplateKind {
    /// All kinds in a stable order.
    pub fn all() -> &'static [TemplateKind] {
        &[
            TemplateKind::AboutMe,
            TemplateKind::Skills,
            TemplateKind::Practicum,
            TemplateKind::Contact,
            TemplateKind::Readme,
            TemplateKind::ProfilePage,
        ]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateKind::AboutMe     => "profile/about.md.tera",
            TemplateKind::Skills      => "profile/skills.md.tera",
            TemplateKind::Practicum   => "profile/practicum.md.tera",
            TemplateKind::Contact     => "profile/contact.md.tera",
            TemplateKind::Readme      => "student/readme.md.tera",
            TemplateKind::ProfilePage => "site/profile.html.tera",
        }
    }

    /// Key the context is nested under.
    pub fn context_key(&self) -> &'static str {
        match self {
            TemplateKind::AboutMe | TemplateKind::Skills | TemplateKind::Contact => "profile",
            TemplateKind::Practicum => "practicum",
            TemplateKind::Readme => "readme",
            TemplateKind::ProfilePage => "page",
        }
    }

    /// Profile sections are followed by a blank line so the next `## ` heading
    /// stands apart; Contact closes the document.
    fn is_inner_section(&self) -> bool {
        matches!(
            self,
            TemplateKind::AboutMe | TemplateKind::Skills | TemplateKind::Practicum
        )
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded defaults.
/// Template names are normalised to lowercase and relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`], loading embedded templates plus any
    /// overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render `kind` with `ctx` nested under the kind's context key.
    ///
    /// Output always uses LF line endings and ends with a single newline
    /// (two for inner profile sections).
    pub fn render<T: Serialize>(&self, kind: TemplateKind, ctx: &T) -> Result<String, RenderError> {
        let tera_ctx = to_tera_context(kind.context_key(), ctx)?;
        let rendered = self.tera.render(kind.template_name(), &tera_ctx)?;
        let mut out = rendered.replace("\r\n", "\n").trim_end().to_string();
        out.push('\n');
        if kind.is_inner_section() {
            out.push('\n');
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Typed front end over [`TemplateEngine`]. Create once and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Construct a new [`Renderer`] with embedded templates.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_overrides(None)
    }

    /// Embedded templates shadowed by any `.tera` files under `dir`.
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(dir)? })
    }

    pub fn about_me(&self, ctx: &ProfileContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::AboutMe, ctx)
    }

    pub fn skills(&self, ctx: &ProfileContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::Skills, ctx)
    }

    pub fn contact(&self, ctx: &ProfileContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::Contact, ctx)
    }

    pub fn practicum(&self, ctx: &PracticumContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::Practicum, ctx)
    }

    pub fn readme(&self, ctx: &ReadmeContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::Readme, ctx)
    }

    pub fn profile_page(&self, ctx: &PageContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::ProfilePage, ctx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
