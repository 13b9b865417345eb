//! Renders a template into an element project.
//!
//! Three files are rewritten from the creation answers:
//!
//! - `package.json` gets the scoped package name and the `defaiElement` block
//! - `manifest.json` gets identity, listing and pricing fields
//! - the entry file has its placeholder sentinels substituted
//!
//! Everything else is copied verbatim.

use std::path::Path;

use tracing::{debug, instrument};

use defai_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{
        DESCRIPTOR_FILE, ElementDetails, ElementManifest, MANIFEST_FILE, ProjectDescriptor,
        ProjectStructure, Template,
    },
    error::CoreResult,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ElementRenderer;

impl ElementRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for ElementRenderer {
    #[instrument(skip_all, fields(template = %template.id, element = %details.name))]
    fn render(
        &self,
        template: &Template,
        details: &ElementDetails,
        output_root: &Path,
    ) -> CoreResult<ProjectStructure> {
        template.validate()?;

        let mut structure = ProjectStructure::new(output_root);
        for file in &template.files {
            let source = file.content.as_str();
            let content = match file.path.to_slash_string().as_str() {
                DESCRIPTOR_FILE => render_descriptor(source, details)?,
                MANIFEST_FILE => render_manifest(source, details)?,
                _ if file.path == template.metadata.entry => details.apply_placeholders(source),
                _ => source.to_string(),
            };
            structure.add_file(file.path.clone(), content);
        }

        structure.validate()?;
        debug!(entries = structure.entry_count(), "template rendered");
        Ok(structure)
    }
}

fn render_descriptor(source: &str, details: &ElementDetails) -> CoreResult<String> {
    let mut descriptor = ProjectDescriptor::parse(source)?;
    descriptor.apply_details(details);
    Ok(descriptor.to_pretty_json())
}

fn render_manifest(source: &str, details: &ElementDetails) -> CoreResult<String> {
    let mut manifest =
        ElementManifest::parse(source).map_err(|issues| ApplicationError::RenderingFailed {
            reason: format!("template manifest.json is invalid: {}", issues.join("; ")),
        })?;
    manifest.apply_details(details);
    Ok(manifest.to_pretty_json())
}

#[cfg(test)]
mod tests {
    use defai_core::{
        application::ports::TemplateStore,
        domain::{Category, TemplateId, Tier},
    };
    use serde_json::Value;

    use super::*;
    use crate::InMemoryStore;

    fn render(template: &str, details: &ElementDetails) -> ProjectStructure {
        let store = InMemoryStore::new();
        store.load_builtin().unwrap();
        let template = store.get(&TemplateId::parse(template).unwrap()).unwrap();
        ElementRenderer::new()
            .render(&template, details, Path::new("/work/out"))
            .unwrap()
    }

    fn details() -> ElementDetails {
        ElementDetails::new("whale-watch")
            .unwrap()
            .with_description("Tracks large transfers")
            .with_author("Grace")
            .with_category(Category::AiTools)
            .with_tier(Tier::Silver)
            .with_price(12.0)
            .unwrap()
    }

    #[test]
    fn descriptor_gets_scoped_name_and_config() {
        let structure = render("react", &details());
        let descriptor: Value =
            serde_json::from_str(structure.file("package.json").unwrap()).unwrap();

        assert_eq!(descriptor["name"], "@defai-element/whale-watch");
        assert_eq!(descriptor["author"], "Grace");
        assert_eq!(descriptor["defaiElement"]["id"], "whale-watch");
        assert_eq!(descriptor["defaiElement"]["displayName"], "Whale Watch");
        assert_eq!(descriptor["defaiElement"]["category"], "AI Tools");
        assert_eq!(descriptor["defaiElement"]["tier"], "silver");
        assert!(descriptor["scripts"]["dev"].is_string());
    }

    #[test]
    fn manifest_gets_listing_fields() {
        let structure = render("trading", &details());
        let manifest = ElementManifest::parse(structure.file("manifest.json").unwrap()).unwrap();

        assert_eq!(manifest.id, "whale-watch");
        assert_eq!(manifest.name, "Whale Watch");
        assert_eq!(manifest.tier_required, Tier::Silver);
        assert_eq!(manifest.price, 12.0);
        assert_eq!(manifest.version, "1.0.0");
    }

    #[test]
    fn entry_placeholders_are_replaced() {
        let structure = render("react", &details());
        let entry = structure.file("src/index.tsx").unwrap();

        assert!(entry.contains("id: 'whale-watch'"));
        assert!(entry.contains("name: 'Whale Watch'"));
        assert!(entry.contains("description: 'Tracks large transfers'"));
        assert!(entry.contains("author: 'Grace'"));
        assert!(entry.contains("category: 'AI Tools'"));
        assert!(entry.contains("tier: 'silver'"));
        assert!(!entry.contains("element-id"));
    }

    #[test]
    fn other_files_are_copied_verbatim() {
        let structure = render("vanilla", &details());
        let css = structure.file("src/styles.css").unwrap();
        assert!(css.contains(".element-dark"));
        assert!(structure.file("src/index.jsx").is_some());
    }
}
