//! Project name resolution.
//!
//! Compose prefixes named volumes with the project name. By default that is the
//! project directory's base name; `--project-name` (or a custom resolver) overrides it.

use std::path::Path;

pub trait ProjectNameResolver {
    fn project_name(&self, project_dir: &Path) -> String;
}

/// Base name of the project directory ("unknown" if it has none).
#[derive(Debug, Clone, Copy, Default)]
pub struct DirBasename;

impl ProjectNameResolver for DirBasename {
    fn project_name(&self, project_dir: &Path) -> String {
        // "." and ".." have no file_name; resolve them first.
        let resolved = project_dir
            .canonicalize()
            .unwrap_or_else(|_| project_dir.to_path_buf());
        resolved
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Fixed, caller-supplied project name.
#[derive(Debug, Clone)]
pub struct FixedProjectName(pub String);

impl ProjectNameResolver for FixedProjectName {
    fn project_name(&self, _project_dir: &Path) -> String {
        self.0.clone()
    }
}
