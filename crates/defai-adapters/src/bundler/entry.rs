use std::path::Path;

use tracing::debug;

use super::BundlerError;

/// Entry files, in the order they are tried.
pub const ENTRY_CANDIDATES: [&str; 4] = [
    "src/index.tsx",
    "src/index.jsx",
    "src/index.ts",
    "src/index.js",
];

/// First entry candidate present under `project_dir`, as a relative path.
pub fn detect_entry(project_dir: &Path) -> Result<&'static str, BundlerError> {
    let entry = ENTRY_CANDIDATES
        .into_iter()
        .find(|candidate| project_dir.join(candidate).is_file())
        .ok_or_else(|| BundlerError::EntryNotFound {
            dir: project_dir.to_path_buf(),
        })?;
    debug!(entry, "entry point detected");
    Ok(entry)
}
