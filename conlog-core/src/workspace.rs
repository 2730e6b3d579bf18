//! Destination workspace for copied logs.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

/// A build workspace directory that destination files are created under.
///
/// Destination names are confined to the workspace: absolute paths and
/// paths containing `..` are rejected, so an expanded file name cannot
/// escape the root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create (or truncate) `name` under the workspace root and return the
    /// open file. Missing parent directories are created.
    pub fn create_file(&self, name: &str) -> Result<File> {
        if name.is_empty() {
            bail!("Workspace file name is empty");
        }
        let rel = Path::new(name);
        if rel.is_absolute() {
            bail!("Workspace file name must be relative: {name}");
        }
        if rel.components().any(|c| matches!(c, Component::ParentDir)) {
            bail!("Workspace file name must not contain '..': {name}");
        }

        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))
    }
}
