//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use defai_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{CoreError, CoreResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> CoreResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> CoreResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> CoreResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> CoreResult<Vec<PathBuf>> {
        std::fs::read_dir(path)
            .map_err(|e| map_io_error(path, e, "read directory"))?
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .map_err(|e| map_io_error(path, e, "read directory"))
            })
            .collect()
    }

    fn remove_dir_all(&self, path: &Path) -> CoreResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> CoreError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_files_and_lists_children() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        let src = dir.path().join("src");

        fs.create_dir_all(&src).unwrap();
        fs.write_file(&src.join("index.tsx"), "export {}").unwrap();

        assert!(fs.is_dir(&src));
        assert_eq!(fs.read_to_string(&src.join("index.tsx")).unwrap(), "export {}");
        assert_eq!(fs.read_dir(&src).unwrap(), vec![src.join("index.tsx")]);
    }

    #[test]
    fn read_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("manifest.json");
        let err = LocalFilesystem.read_to_string(&missing).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("manifest.json"));
        assert!(message.contains("Failed to read file"));
    }
}
