//! Template Service - template queries for `templates` and `create`.

use serde::Serialize;

use crate::{
    application::ports::TemplateStore,
    domain::{Template, TemplateId},
    error::CoreResult,
};

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub entry: String,
    pub files: usize,
}

impl From<&Template> for TemplateInfo {
    fn from(t: &Template) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.metadata.name.clone(),
            description: t.metadata.description.clone(),
            entry: t.metadata.entry.to_string(),
            files: t.files.len(),
        }
    }
}

pub struct TemplateService {
    store: Box<dyn TemplateStore>,
}

impl TemplateService {
    pub fn new(store: Box<dyn TemplateStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, id: &TemplateId) -> CoreResult<Template> {
        self.store.get(id)
    }

    /// Add or replace a template.
    pub fn save(&self, template: Template) -> CoreResult<()> {
        self.store.insert(template)
    }

    /// All templates, sorted by id.
    pub fn list(&self) -> CoreResult<Vec<TemplateInfo>> {
        Ok(self.store.list()?.iter().map(TemplateInfo::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::application::ApplicationError;
    use crate::domain::{RelativePath, TemplateContent, TemplateFile, TemplateMetadata};

    #[derive(Default)]
    struct VecStore(Mutex<Vec<Template>>);

    impl TemplateStore for VecStore {
        fn get(&self, id: &TemplateId) -> CoreResult<Template> {
            self.0
                .lock()
                .map_err(|_| ApplicationError::StoreLockError)?
                .iter()
                .find(|t| &t.id == id)
                .cloned()
                .ok_or_else(|| ApplicationError::TemplateNotFound { id: id.to_string() }.into())
        }

        fn list(&self) -> CoreResult<Vec<Template>> {
            Ok(self.0.lock().map_err(|_| ApplicationError::StoreLockError)?.clone())
        }

        fn insert(&self, template: Template) -> CoreResult<()> {
            self.0
                .lock()
                .map_err(|_| ApplicationError::StoreLockError)?
                .push(template);
            Ok(())
        }
    }

    fn template(id: &str) -> Template {
        let rel = |p: &str| RelativePath::try_new(p).unwrap();
        let file = |p: &str| TemplateFile::new(rel(p), TemplateContent::Static(""));
        Template::builder()
            .id(TemplateId::parse(id).unwrap())
            .metadata(
                TemplateMetadata::new("Chart", rel("src/index.tsx"))
                    .description("Data visualization element"),
            )
            .files([file("package.json"), file("manifest.json"), file("src/index.tsx")])
            .build()
            .unwrap()
    }

    #[test]
    fn lists_saved_templates() {
        let service = TemplateService::new(Box::new(VecStore::default()));
        service.save(template("chart")).unwrap();

        let infos = service.list().unwrap();
        assert_eq!(
            infos,
            [TemplateInfo {
                id: "chart".into(),
                name: "Chart".into(),
                description: "Data visualization element".into(),
                entry: "src/index.tsx".into(),
                files: 3,
            }]
        );
    }

    #[test]
    fn get_unknown_template_fails() {
        let service = TemplateService::new(Box::new(VecStore::default()));
        let err = service.get(&TemplateId::parse("ghost").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Template not found: 'ghost'");
    }
}
