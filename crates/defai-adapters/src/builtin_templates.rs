//! Built-in templates, compiled into the binary.
//!
//! Each template lives under `crates/defai-adapters/templates/<id>/` with a
//! `template.toml` in the same format the [`template_loader`] reads from
//! disk. The files are embedded with `include_str!` so a release binary
//! needs nothing next to it.
//!
//! Custom templates from `$DEFAI_TEMPLATES_DIR` are layered on top by
//! [`InMemoryStore::with_builtin`](crate::InMemoryStore::with_builtin).
//!
//! [`template_loader`]: crate::template_loader

use std::path::Path;

use tracing::{debug, instrument};

use defai_core::domain::{RelativePath, Template, TemplateContent, TemplateFile};

use crate::template_loader::{TEMPLATE_MANIFEST, TemplateLoadError, TemplateManifest};

/// Template used when `--template` is not given.
pub const DEFAULT_TEMPLATE: &str = "react";

struct EmbeddedTemplate {
    id: &'static str,
    manifest: &'static str,
    files: &'static [(&'static str, &'static str)],
}

/// Embed `templates/<id>/template.toml` plus the shared file set and the
/// listed entry file.
macro_rules! embedded {
    ($id:literal, $entry:literal) => {
        EmbeddedTemplate {
            id: $id,
            manifest: include_str!(concat!("../templates/", $id, "/template.toml")),
            files: &[
                (".gitignore", include_str!(concat!("../templates/", $id, "/.gitignore"))),
                ("README.md", include_str!(concat!("../templates/", $id, "/README.md"))),
                ("manifest.json", include_str!(concat!("../templates/", $id, "/manifest.json"))),
                ("package.json", include_str!(concat!("../templates/", $id, "/package.json"))),
                (
                    "public/index.html",
                    include_str!(concat!("../templates/", $id, "/public/index.html")),
                ),
                ("src/styles.css", include_str!(concat!("../templates/", $id, "/src/styles.css"))),
                ("tsconfig.json", include_str!(concat!("../templates/", $id, "/tsconfig.json"))),
                ($entry, include_str!(concat!("../templates/", $id, "/", $entry))),
            ],
        }
    };
}

const EMBEDDED: [EmbeddedTemplate; 6] = [
    embedded!("chart", "src/index.tsx"),
    embedded!("game", "src/index.tsx"),
    embedded!("react", "src/index.tsx"),
    embedded!("trading", "src/index.tsx"),
    embedded!("vanilla", "src/index.jsx"),
    embedded!("vue", "src/index.jsx"),
];

/// Ids of the built-in templates, sorted.
pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
    EMBEDDED.iter().map(|t| t.id)
}

/// Parse every built-in template.
///
/// # Errors
///
/// Only if an embedded template is malformed, which the tests below rule out.
#[instrument]
pub fn all_templates() -> Result<Vec<Template>, TemplateLoadError> {
    let templates = EMBEDDED
        .iter()
        .map(EmbeddedTemplate::load)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = templates.len(), "built-in templates loaded");
    Ok(templates)
}

impl EmbeddedTemplate {
    fn load(&self) -> Result<Template, TemplateLoadError> {
        let origin = Path::new("builtin").join(self.id).join(TEMPLATE_MANIFEST);
        let manifest = TemplateManifest::parse(self.manifest, &origin)?;

        let files = self
            .files
            .iter()
            .map(|(path, content)| {
                Ok(TemplateFile::new(
                    RelativePath::try_new(*path)?,
                    TemplateContent::Static(*content),
                ))
            })
            .collect::<Result<Vec<_>, TemplateLoadError>>()?;

        manifest.into_template(files)
    }
}
