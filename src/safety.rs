use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keeps plan writes inside the workspace and away from Go's own trees.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical workspace root
    workspace_root: PathBuf,
    /// Canonical directories that must never be written
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

/// Directories owned by the Go toolchain: the module cache and `GOROOT`.
fn go_toolchain_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Some(cache) = std::env::var_os("GOMODCACHE") {
        dirs.push(PathBuf::from(cache));
    }
    match std::env::var_os("GOPATH") {
        Some(gopath) => {
            for entry in std::env::split_paths(&gopath) {
                dirs.push(entry.join("pkg/mod"));
            }
        }
        None => {
            if let Some(home) = home::home_dir() {
                dirs.push(home.join("go/pkg/mod"));
            }
        }
    }
    if let Some(goroot) = std::env::var_os("GOROOT") {
        dirs.push(PathBuf::from(goroot));
    }

    dirs
}

impl WorkspaceGuard {
    /// Create a guard rooted at `workspace_root`.
    ///
    /// Forbidden directories that do not exist on this machine are skipped.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;

        let mut forbidden_paths: Vec<PathBuf> = go_toolchain_dirs()
            .into_iter()
            .filter_map(|dir| dir.canonicalize().ok())
            .collect();

        // Vendored dependencies are regenerated by `go mod vendor`
        if let Ok(vendor) = workspace_root.join("vendor").canonicalize() {
            forbidden_paths.push(vendor);
        }

        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    /// Check that `path` may be edited and return its canonical form.
    ///
    /// Relative paths are resolved against the workspace root.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        // Resolves symlinks and `..`
        let canonical = absolute.canonicalize()?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        if !canonical.starts_with(&self.workspace_root) {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            });
        }

        if let Some(forbidden) = self
            .forbidden_paths
            .iter()
            .find(|forbidden| canonical.starts_with(forbidden))
        {
            return Err(SafetyError::ForbiddenPath {
                path: canonical.to_path_buf(),
                forbidden: forbidden.clone(),
            });
        }

        Ok(())
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn forbidden_paths(&self) -> &[PathBuf] {
        &self.forbidden_paths
    }
}
