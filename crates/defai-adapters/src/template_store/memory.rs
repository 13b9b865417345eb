//! In-memory template store with built-in templates.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, RwLock},
};

use tracing::{info, warn};

use defai_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{Template, TemplateId},
    error::CoreResult,
};

use crate::{builtin_templates, template_loader::FilesystemTemplateLoader};

/// Thread-safe in-memory template store, iterated in id order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<BTreeMap<TemplateId, Template>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the built-in templates plus any found under
    /// `$DEFAI_TEMPLATES_DIR`. Custom templates replace built-ins that share
    /// their id.
    pub fn with_builtin() -> CoreResult<Self> {
        let store = Self::new();
        store.load_builtin()?;
        if let Some(loader) = FilesystemTemplateLoader::from_env() {
            store.load_dir(loader.dir())?;
        }
        Ok(store)
    }

    pub fn load_builtin(&self) -> CoreResult<()> {
        for template in builtin_templates::all_templates()? {
            self.insert(template)?;
        }
        Ok(())
    }

    /// Load custom templates from `dir`. A missing directory is logged, not
    /// fatal.
    pub fn load_dir(&self, dir: &Path) -> CoreResult<usize> {
        let templates = match FilesystemTemplateLoader::new(dir).load_all() {
            Ok(templates) => templates,
            Err(e) => {
                warn!(error = %e, "custom templates not loaded");
                return Ok(0);
            }
        };

        let count = templates.len();
        for template in templates {
            self.insert(template)?;
        }
        info!(count, dir = %dir.display(), "custom templates loaded");
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateStore for InMemoryStore {
    fn get(&self, id: &TemplateId) -> CoreResult<Template> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(id).cloned().ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                id: id.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> CoreResult<Vec<Template>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.values().cloned().collect())
    }

    fn insert(&self, template: Template) -> CoreResult<()> {
        template.validate()?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if inner.insert(template.id.clone(), template).is_some() {
            info!("template replaced by a later definition");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn builtin_store_has_every_template() {
        let store = InMemoryStore::new();
        store.load_builtin().unwrap();

        assert_eq!(store.len(), 6);
        let react = store.get(&TemplateId::parse("react").unwrap()).unwrap();
        assert_eq!(react.metadata.entry.to_string(), "src/index.tsx");
    }

    #[test]
    fn unknown_template_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get(&TemplateId::parse("svelte").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Template not found: 'svelte'");
    }

    #[test]
    fn custom_templates_override_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let react = dir.path().join("react");
        fs::create_dir_all(react.join("src")).unwrap();
        fs::write(
            react.join("template.toml"),
            "[template]\nid = \"react\"\n\n[metadata]\nname = \"House React\"\nentry = \"src/index.tsx\"\n",
        )
        .unwrap();
        fs::write(react.join("package.json"), "{}").unwrap();
        fs::write(react.join("manifest.json"), "{}").unwrap();
        fs::write(react.join("src/index.tsx"), "").unwrap();

        let store = InMemoryStore::new();
        store.load_builtin().unwrap();
        assert_eq!(store.load_dir(dir.path()).unwrap(), 1);

        let react = store.get(&TemplateId::parse("react").unwrap()).unwrap();
        assert_eq!(react.metadata.name, "House React");
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn missing_custom_directory_is_not_fatal() {
        let store = InMemoryStore::new();
        assert_eq!(store.load_dir(Path::new("/no/such/templates")).unwrap(), 0);
    }
}
