//! Materialize Service - turns a template into a new element project.
//!
//! Workflow:
//! 1. Look up the template (unknown ids fail before anything is written)
//! 2. Render it with the element details
//! 3. Prepare the target directory according to the conflict policy
//! 4. Write every entry, rolling back on failure
//!
//! Installing dependencies is not part of this service; the CLI runs the
//! package manager afterwards so a failed install leaves the files in place.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer, TemplateStore},
    },
    domain::{ElementDetails, FsEntry, ProjectStructure, TemplateId},
    error::CoreResult,
};

/// What to do when the target directory already has content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Fail with `ProjectExists`.
    #[default]
    Abort,
    /// Delete the directory and start over.
    Replace,
    /// Write over existing files and keep the rest.
    Merge,
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub template: TemplateId,
    pub details: ElementDetails,
    pub target_dir: PathBuf,
    pub on_conflict: ConflictPolicy,
}

impl CreateRequest {
    pub fn new(template: TemplateId, details: ElementDetails, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            template,
            details,
            target_dir: target_dir.into(),
            on_conflict: ConflictPolicy::Abort,
        }
    }

    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = policy;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeOutcome {
    pub root: PathBuf,
    pub template: TemplateId,
    pub files_written: usize,
    pub directories_created: usize,
}

pub struct MaterializeService {
    store: Box<dyn TemplateStore>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl MaterializeService {
    pub fn new(
        store: Box<dyn TemplateStore>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            store,
            renderer,
            filesystem,
        }
    }

    /// Create a project on disk from `request`.
    #[instrument(
        skip_all,
        fields(
            element = %request.details.name,
            template = %request.template,
            target = %request.target_dir.display()
        )
    )]
    pub fn create(&self, request: &CreateRequest) -> CoreResult<MaterializeOutcome> {
        let template = self.store.get(&request.template)?;
        debug!(template_name = %template.metadata.name, "Template resolved");

        let structure = self
            .renderer
            .render(&template, &request.details, &request.target_dir)?;
        structure.validate()?;

        let owns_root = self.prepare_target(&request.target_dir, request.on_conflict)?;
        self.write_structure(&structure, owns_root)?;

        let outcome = MaterializeOutcome {
            root: structure.root().to_path_buf(),
            template: request.template.clone(),
            files_written: structure.files().count(),
            directories_created: structure.directories().count(),
        };
        info!(files = outcome.files_written, "Element project created");
        Ok(outcome)
    }

    /// Returns whether the root may be removed on rollback.
    fn prepare_target(&self, root: &Path, policy: ConflictPolicy) -> CoreResult<bool> {
        if !self.filesystem.exists(root) {
            return Ok(true);
        }

        let is_empty_dir =
            self.filesystem.is_dir(root) && self.filesystem.read_dir(root)?.is_empty();
        if is_empty_dir {
            return Ok(false);
        }

        match policy {
            ConflictPolicy::Abort => Err(ApplicationError::ProjectExists {
                path: root.to_path_buf(),
            }
            .into()),
            ConflictPolicy::Replace => {
                warn!(path = %root.display(), "Replacing existing directory");
                self.filesystem.remove_dir_all(root)?;
                Ok(true)
            }
            ConflictPolicy::Merge => Ok(false),
        }
    }

    fn write_structure(&self, structure: &ProjectStructure, owns_root: bool) -> CoreResult<()> {
        match self.write_all(structure) {
            Ok(()) => Ok(()),
            Err(e) if owns_root => {
                warn!("Write failed, attempting rollback");
                self.rollback(structure.root());
                Err(e)
            }
            Err(e) => {
                warn!(
                    path = %structure.root().display(),
                    "Write failed in a pre-existing directory; partial files left in place"
                );
                Err(e)
            }
        }
    }

    fn write_all(&self, structure: &ProjectStructure) -> CoreResult<()> {
        let root = structure.root();
        self.filesystem.create_dir_all(root)?;

        for entry in structure.entries() {
            match entry {
                FsEntry::Directory(dir) => {
                    self.filesystem.create_dir_all(&root.join(&dir.path))?;
                }
                FsEntry::File(file) => {
                    let path = root.join(&file.path);
                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }
                    self.filesystem.write_file(&path, &file.content)?;
                }
            }
        }

        Ok(())
    }

    /// Best-effort cleanup.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(root) {
            warn!(error = %e, path = %root.display(), "Rollback failed");
        } else {
            info!("Rollback successful");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        application::ports::MockFilesystem,
        domain::{
            RelativePath, Template, TemplateContent, TemplateFile, TemplateMetadata,
        },
        error::CoreError,
    };

    fn rel(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    fn sample_template() -> Template {
        let file = |p: &str| TemplateFile::new(rel(p), TemplateContent::Static("{}"));
        Template::builder()
            .id(TemplateId::parse("react").unwrap())
            .metadata(TemplateMetadata::new("React", rel("src/index.tsx")))
            .files([file("package.json"), file("manifest.json"), file("src/index.tsx")])
            .build()
            .unwrap()
    }

    struct OneTemplate;

    impl TemplateStore for OneTemplate {
        fn get(&self, id: &TemplateId) -> CoreResult<Template> {
            if id.as_str() == "react" {
                Ok(sample_template())
            } else {
                Err(ApplicationError::TemplateNotFound { id: id.to_string() }.into())
            }
        }

        fn list(&self) -> CoreResult<Vec<Template>> {
            Ok(vec![sample_template()])
        }

        fn insert(&self, _: Template) -> CoreResult<()> {
            Ok(())
        }
    }

    struct CopyRenderer;

    impl TemplateRenderer for CopyRenderer {
        fn render(
            &self,
            template: &Template,
            _: &ElementDetails,
            root: &Path,
        ) -> CoreResult<ProjectStructure> {
            let mut structure = ProjectStructure::new(root);
            for f in &template.files {
                structure.add_file(f.path.clone(), f.content.as_str().to_string());
            }
            Ok(structure)
        }
    }

    fn request(template: &str) -> CreateRequest {
        CreateRequest::new(
            TemplateId::parse(template).unwrap(),
            ElementDetails::new("my-widget").unwrap(),
            "/work/my-widget",
        )
    }

    fn service(fs: MockFilesystem) -> MaterializeService {
        MaterializeService::new(Box::new(OneTemplate), Box::new(CopyRenderer), Box::new(fs))
    }

    #[test]
    fn writes_every_file_into_fresh_directory() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        let log = Arc::clone(&written);
        fs.expect_write_file().returning(move |p, _| {
            log.lock().unwrap().push(p.to_path_buf());
            Ok(())
        });

        let outcome = service(fs).create(&request("react")).unwrap();

        assert_eq!(outcome.files_written, 3);
        assert_eq!(outcome.root, PathBuf::from("/work/my-widget"));
        let written = written.lock().unwrap();
        assert!(written.contains(&PathBuf::from("/work/my-widget/src/index.tsx")));
    }

    #[test]
    fn unknown_template_writes_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();
        fs.expect_create_dir_all().never();

        let err = service(fs).create(&request("nope")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Application(ApplicationError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn existing_directory_aborts_by_default() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_is_dir().returning(|_| true);
        fs.expect_read_dir()
            .returning(|_| Ok(vec![PathBuf::from("/work/my-widget/old.txt")]));
        fs.expect_write_file().never();

        let err = service(fs).create(&request("react")).unwrap_err();
        assert_eq!(err.to_string(), "Directory already exists: /work/my-widget");
    }

    #[test]
    fn replace_clears_directory_first() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_is_dir().returning(|_| true);
        fs.expect_read_dir()
            .returning(|_| Ok(vec![PathBuf::from("/work/my-widget/old.txt")]));
        fs.expect_remove_dir_all()
            .withf(|p: &Path| p == Path::new("/work/my-widget"))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().times(3).returning(|_, _| Ok(()));

        let req = request("react").on_conflict(ConflictPolicy::Replace);
        assert!(service(fs).create(&req).is_ok());
    }

    #[test]
    fn failed_write_rolls_back_new_directory() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|p, _| {
            Err(ApplicationError::FilesystemError {
                path: p.to_path_buf(),
                reason: "disk full".into(),
            }
            .into())
        });
        fs.expect_remove_dir_all().times(1).returning(|_| Ok(()));

        assert!(service(fs).create(&request("react")).is_err());
    }

    #[test]
    fn failed_merge_keeps_existing_directory() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_is_dir().returning(|_| true);
        fs.expect_read_dir()
            .returning(|_| Ok(vec![PathBuf::from("/work/my-widget/notes.md")]));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|p, _| {
            Err(ApplicationError::FilesystemError {
                path: p.to_path_buf(),
                reason: "read-only".into(),
            }
            .into())
        });
        fs.expect_remove_dir_all().never();

        let req = request("react").on_conflict(ConflictPolicy::Merge);
        assert!(service(fs).create(&req).is_err());
    }
}
