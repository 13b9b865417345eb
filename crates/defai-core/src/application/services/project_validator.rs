//! Project Validator - structural checks on an element project directory.
//!
//! A valid project has:
//!
//! - `package.json` with a `name` and a `defaiElement` block
//! - `manifest.json` with every required field
//! - a `src/` directory with a `.tsx` or `.jsx` entry point
//!
//! Checks accumulate into one [`ValidationResult`] so a user can fix every
//! problem in a single pass. The only early exit is a missing project
//! directory, where nothing else can be checked.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    application::ports::Filesystem,
    domain::{
        DESCRIPTOR_FILE, ElementConfig, MANIFEST_FILE, ValidationResult,
        validation::{
            is_populated, is_scoped_package_name, manifest_semantic_issues,
            missing_manifest_fields, validate_permissions,
        },
    },
    error::CoreResult,
};

pub const PROJECT_MISSING: &str = "Project directory does not exist";

/// Files every project needs. Each group is satisfied by any one member;
/// when no member exists, every member is reported.
const REQUIRED_FILES: [&[&str]; 3] = [
    &[DESCRIPTOR_FILE],
    &[MANIFEST_FILE],
    &["src/index.tsx", "src/index.jsx"],
];

const ENTRY_FILES: [&str; 2] = ["index.tsx", "index.jsx"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Also check enum values, size bounds and ordering, permissions,
    /// version format and the package name convention.
    pub strict: bool,
    /// Only review the manifest's permission set.
    pub security_only: bool,
}

impl ValidationOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Validates element projects through the `Filesystem` port.
pub struct ProjectValidator {
    filesystem: Box<dyn Filesystem>,
}

impl ProjectValidator {
    pub fn new(filesystem: Box<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Validate the project at `project_dir`.
    ///
    /// Never fails: I/O errors become a single `Validation error: ...`
    /// entry after whatever was already collected.
    #[instrument(
        skip(self),
        fields(dir = %project_dir.display())
    )]
    pub fn validate_project(
        &self,
        project_dir: &Path,
        options: ValidationOptions,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !self.filesystem.is_dir(project_dir) {
            result.push(PROJECT_MISSING);
            return result;
        }

        let checks = if options.security_only {
            self.check_permissions_only(project_dir, &mut result)
        } else {
            self.run_checks(project_dir, options, &mut result)
        };

        if let Err(e) = checks {
            warn!(error = %e, "I/O failure while validating project");
            result.push(format!("Validation error: {e}"));
        }

        debug!(errors = result.errors().len(), "Validation finished");
        result
    }

    fn run_checks(
        &self,
        dir: &Path,
        options: ValidationOptions,
        result: &mut ValidationResult,
    ) -> CoreResult<()> {
        self.check_required_files(dir, result);
        self.check_descriptor(dir, options, result)?;
        self.check_manifest(dir, options, result)?;
        self.check_sources(dir, result)?;
        Ok(())
    }

    fn check_required_files(&self, dir: &Path, result: &mut ValidationResult) {
        for group in REQUIRED_FILES {
            if group.iter().any(|f| self.filesystem.exists(&dir.join(f))) {
                continue;
            }
            for file in group {
                result.push(format!("Missing required file: {file}"));
            }
        }
    }

    fn check_descriptor(
        &self,
        dir: &Path,
        options: ValidationOptions,
        result: &mut ValidationResult,
    ) -> CoreResult<()> {
        let Some(descriptor) = self.read_json(&dir.join(DESCRIPTOR_FILE))? else {
            return Ok(());
        };
        let Some(descriptor) = descriptor.filter(Value::is_object) else {
            result.push("Invalid package.json format");
            return Ok(());
        };

        if !is_populated(descriptor.get("name")) {
            result.push("package.json missing \"name\" field");
        }

        let config = descriptor
            .get("defaiElement")
            .filter(|v| v.as_object().is_some_and(|m| !m.is_empty()));
        let Some(config) = config else {
            result.push("package.json missing \"defaiElement\" configuration");
            return Ok(());
        };

        if options.strict {
            if let Some(name) = descriptor.get("name").and_then(Value::as_str) {
                if !name.is_empty() && !is_scoped_package_name(name) {
                    result.push(format!(
                        "package.json \"name\" should follow @scope/<element-name> (got \"{name}\")"
                    ));
                }
            }
            if let Err(e) = serde_json::from_value::<ElementConfig>(config.clone()) {
                result.push(format!("package.json \"defaiElement\" is invalid: {e}"));
            }
        }

        Ok(())
    }

    fn check_manifest(
        &self,
        dir: &Path,
        options: ValidationOptions,
        result: &mut ValidationResult,
    ) -> CoreResult<()> {
        let Some(manifest) = self.read_json(&dir.join(MANIFEST_FILE))? else {
            return Ok(());
        };
        let Some(manifest) = manifest.filter(Value::is_object) else {
            result.push("Invalid manifest.json format");
            return Ok(());
        };

        result.extend(
            missing_manifest_fields(&manifest)
                .into_iter()
                .map(|field| format!("manifest.json missing \"{field}\" field")),
        );

        if options.strict {
            result.extend(manifest_semantic_issues(&manifest));
        }

        Ok(())
    }

    fn check_sources(&self, dir: &Path, result: &mut ValidationResult) -> CoreResult<()> {
        let src = dir.join("src");
        if !self.filesystem.is_dir(&src) {
            result.push("Missing src directory");
            return Ok(());
        }

        let has_entry = ENTRY_FILES
            .iter()
            .any(|name| self.filesystem.exists(&src.join(name)));
        if !has_entry {
            result.push("Missing source file: src/index.tsx or src/index.jsx");
        }

        Ok(())
    }

    fn check_permissions_only(&self, dir: &Path, result: &mut ValidationResult) -> CoreResult<()> {
        let path = dir.join(MANIFEST_FILE);
        match self.read_json(&path)? {
            None => result.push(format!("Missing required file: {MANIFEST_FILE}")),
            Some(None) => result.push("Invalid manifest.json format"),
            Some(Some(manifest)) => {
                if let Some(permissions) = manifest.get("permissions") {
                    if !validate_permissions(permissions) {
                        result.push(
                            "manifest.json \"permissions\" contains unknown capabilities or non-boolean values",
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// `None` if the file is absent, `Some(None)` if it is not valid JSON.
    fn read_json(&self, path: &Path) -> CoreResult<Option<Option<Value>>> {
        if !self.filesystem.exists(path) {
            return Ok(None);
        }
        let raw = self.filesystem.read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw).ok()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;
    use crate::application::{ApplicationError, ports::MockFilesystem};

    const ROOT: &str = "/work/my-widget";

    /// Minimal read-only tree for driving the mock.
    #[derive(Default, Clone)]
    struct Tree {
        files: HashMap<PathBuf, String>,
        dirs: HashSet<PathBuf>,
    }

    impl Tree {
        fn project() -> Self {
            let mut tree = Self::default();
            tree.dirs.insert(PathBuf::from(ROOT));
            tree
        }

        fn file(mut self, rel: &str, content: impl Into<String>) -> Self {
            let path = Path::new(ROOT).join(rel);
            let mut parent = path.parent();
            while let Some(p) = parent {
                if p.as_os_str().is_empty() {
                    break;
                }
                self.dirs.insert(p.to_path_buf());
                parent = p.parent();
            }
            self.files.insert(path, content.into());
            self
        }

        fn dir(mut self, rel: &str) -> Self {
            self.dirs.insert(Path::new(ROOT).join(rel));
            self
        }

        fn into_validator(self) -> ProjectValidator {
            let mut fs = MockFilesystem::new();
            let t = self.clone();
            fs.expect_exists()
                .returning(move |p| t.files.contains_key(p) || t.dirs.contains(p));
            let t = self.clone();
            fs.expect_is_dir().returning(move |p| t.dirs.contains(p));
            let t = self.clone();
            fs.expect_read_to_string().returning(move |p| {
                t.files.get(p).cloned().ok_or_else(|| {
                    ApplicationError::FilesystemError {
                        path: p.to_path_buf(),
                        reason: "not found".into(),
                    }
                    .into()
                })
            });
            let t = self;
            fs.expect_read_dir().returning(move |dir| {
                Ok(t.files
                    .keys()
                    .filter(|f| f.parent() == Some(dir))
                    .cloned()
                    .collect())
            });
            ProjectValidator::new(Box::new(fs))
        }
    }

    fn package_json() -> String {
        json!({
            "name": "@defai-element/my-widget",
            "defaiElement": {
                "id": "my-widget",
                "displayName": "My Widget",
                "category": "Utilities",
                "tier": "free",
                "price": 0
            }
        })
        .to_string()
    }

    fn manifest_json() -> serde_json::Value {
        json!({
            "id": "my-widget",
            "name": "My Widget",
            "version": "1.0.0",
            "description": "A DEFAI element",
            "author": "Ada",
            "category": "Utilities",
            "tierRequired": "free",
            "price": 0,
            "defaultSize": {"width": 400, "height": 300},
            "minSize": {"width": 200, "height": 150},
            "maxSize": {"width": 800, "height": 600},
            "permissions": {"network": true}
        })
    }

    fn valid_tree() -> Tree {
        Tree::project()
            .file("package.json", package_json())
            .file("manifest.json", manifest_json().to_string())
            .file("src/index.tsx", "export default {}")
    }

    fn validate(tree: Tree) -> ValidationResult {
        tree.into_validator()
            .validate_project(Path::new(ROOT), ValidationOptions::default())
    }

    #[test]
    fn valid_project_passes() {
        let result = validate(valid_tree());
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn jsx_entry_alone_satisfies_entry_group() {
        let tree = Tree::project()
            .file("package.json", package_json())
            .file("manifest.json", manifest_json().to_string())
            .file("src/index.jsx", "export default {}");
        assert!(validate(tree).is_valid());
    }

    #[test]
    fn missing_directory_short_circuits() {
        let validator = Tree::default().into_validator();
        let result = validator.validate_project(Path::new(ROOT), ValidationOptions::default());
        assert_eq!(result.errors(), [PROJECT_MISSING]);
    }

    #[test]
    fn missing_entry_points_accumulate() {
        let tree = Tree::project()
            .file("package.json", package_json())
            .file("manifest.json", manifest_json().to_string())
            .dir("src");
        let result = validate(tree);

        assert!(!result.is_valid());
        assert_eq!(
            result.errors(),
            [
                "Missing required file: src/index.tsx",
                "Missing required file: src/index.jsx",
                "Missing source file: src/index.tsx or src/index.jsx",
            ]
        );
    }

    #[test]
    fn other_source_files_do_not_count_as_an_entry() {
        let tree = Tree::project()
            .file("package.json", package_json())
            .file("manifest.json", manifest_json().to_string())
            .file("src/App.tsx", "export default {}");
        let result = validate(tree);

        assert_eq!(
            result.errors(),
            [
                "Missing required file: src/index.tsx",
                "Missing required file: src/index.jsx",
                "Missing source file: src/index.tsx or src/index.jsx",
            ]
        );
    }

    #[test]
    fn empty_project_reports_everything() {
        let result = validate(Tree::project());
        assert_eq!(
            result.errors(),
            [
                "Missing required file: package.json",
                "Missing required file: manifest.json",
                "Missing required file: src/index.tsx",
                "Missing required file: src/index.jsx",
                "Missing src directory",
            ]
        );
    }

    #[test]
    fn malformed_json_is_one_error_each() {
        let tree = Tree::project()
            .file("package.json", "{ nope")
            .file("manifest.json", "[1, 2")
            .file("src/index.tsx", "");
        let result = validate(tree);
        assert_eq!(
            result.errors(),
            ["Invalid package.json format", "Invalid manifest.json format"]
        );
    }

    #[test]
    fn descriptor_and_manifest_fields_are_checked() {
        let mut manifest = manifest_json();
        manifest["version"] = json!("");
        manifest.as_object_mut().unwrap().remove("tierRequired");
        let tree = Tree::project()
            .file("package.json", json!({"defaiElement": {}}).to_string())
            .file("manifest.json", manifest.to_string())
            .file("src/index.tsx", "");
        let result = validate(tree);
        assert_eq!(
            result.errors(),
            [
                "package.json missing \"name\" field",
                "package.json missing \"defaiElement\" configuration",
                "manifest.json missing \"version\" field",
                "manifest.json missing \"tierRequired\" field",
            ]
        );
    }

    #[test]
    fn strict_mode_enforces_size_ordering() {
        let mut manifest = manifest_json();
        manifest["minSize"] = json!({"width": 600, "height": 150});
        let tree = Tree::project()
            .file("package.json", package_json())
            .file("manifest.json", manifest.to_string())
            .file("src/index.tsx", "");

        let lenient = tree
            .clone()
            .into_validator()
            .validate_project(Path::new(ROOT), ValidationOptions::default());
        assert!(lenient.is_valid());

        let strict = tree
            .into_validator()
            .validate_project(Path::new(ROOT), ValidationOptions::strict());
        assert_eq!(strict.errors().len(), 1, "{:?}", strict.errors());
        assert!(strict.errors()[0].contains("\"minSize\" width (600)"));
    }

    #[test]
    fn strict_mode_checks_package_name() {
        let mut package: serde_json::Value = serde_json::from_str(&package_json()).unwrap();
        package["name"] = json!("my-widget");
        let tree = Tree::project()
            .file("package.json", package.to_string())
            .file("manifest.json", manifest_json().to_string())
            .file("src/index.tsx", "");
        let result = tree
            .into_validator()
            .validate_project(Path::new(ROOT), ValidationOptions::strict());
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("@scope/<element-name>"));
    }

    #[test]
    fn io_failure_becomes_generic_error() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_dir().returning(|_| true);
        fs.expect_exists().returning(|_| true);
        fs.expect_read_to_string().returning(|p| {
            Err(ApplicationError::FilesystemError {
                path: p.to_path_buf(),
                reason: "Permission denied".into(),
            }
            .into())
        });
        let validator = ProjectValidator::new(Box::new(fs));
        let result = validator.validate_project(Path::new(ROOT), ValidationOptions::default());

        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].starts_with("Validation error: "));
        assert!(result.errors()[0].contains("Permission denied"));
    }

    #[test]
    fn security_only_reviews_permissions() {
        let mut manifest = manifest_json();
        manifest["permissions"] = json!({"wallet": "yes"});
        let tree = Tree::project().file("manifest.json", manifest.to_string());
        let result = tree.into_validator().validate_project(
            Path::new(ROOT),
            ValidationOptions {
                security_only: true,
                ..Default::default()
            },
        );
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("permissions"));
    }

    #[test]
    fn validation_is_idempotent() {
        let validator = Tree::project().dir("src").into_validator();
        let first = validator.validate_project(Path::new(ROOT), ValidationOptions::default());
        let second = validator.validate_project(Path::new(ROOT), ValidationOptions::default());
        assert_eq!(first, second);
    }
}
