//! Workspace configuration.
//!
//! Replaces ambient globals with an explicit struct passed to the host at
//! construction. Defaults follow the conventional layout this tooling
//! targets: a `src/` tree with model files under a `models` directory.

use std::path::{Path, PathBuf};

use crate::overlay;

/// Configuration for one analyzed workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// The source root that is watched and scanned for model files.
    pub src_root: PathBuf,
    /// Directory name (one path component) that marks model files.
    pub models_dir: String,
    /// File extensions treated as source files.
    pub extensions: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            src_root: PathBuf::from("src"),
            models_dir: "models".to_string(),
            extensions: vec!["ts".to_string(), "tsx".to_string()],
        }
    }
}

impl WorkspaceConfig {
    /// Whether a path has one of the recognized source extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Whether a path (real or overlay) lies under the models directory.
    pub fn is_model_path(&self, path: &Path) -> bool {
        let real = overlay::to_real_file_name(path);
        real.components().any(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|s| s == self.models_dir)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.models_dir, "models");
        assert!(config.is_source_file(Path::new("a/b.ts")));
        assert!(config.is_source_file(Path::new("a/b.tsx")));
        assert!(!config.is_source_file(Path::new("a/b.rs")));
    }

    #[test]
    fn model_path_detection() {
        let config = WorkspaceConfig::default();
        assert!(config.is_model_path(Path::new("/ws/src/models/app.ts")));
        assert!(config.is_model_path(Path::new("/ws/src/models/app.flux-buf.ts")));
        assert!(!config.is_model_path(Path::new("/ws/src/pages/home.ts")));
        // A file merely named "models.ts" is not under a models directory.
        assert!(!config.is_model_path(Path::new("/ws/src/models.ts")));
    }
}
