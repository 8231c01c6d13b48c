//! Git integration utilities.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::app::scope::{BranchResolver, ProjectRootResolver};

/// Lightweight wrapper around [`gix::Repository`] discovery.
#[derive(Default)]
pub struct GitClient {
    repo: Option<gix::Repository>,
}

impl GitClient {
    /// Attempt to locate a git repository starting from `path`.
    pub fn discover(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let repo = match gix::discover(path) {
            Ok(repo) => Some(repo),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no git repository found");
                None
            }
        };
        Self { repo }
    }

    /// Root of the working tree, if discovery succeeded.
    pub fn work_root(&self) -> Option<PathBuf> {
        let repo = self.repo.as_ref()?;
        repo.work_dir()
            .map(Path::to_path_buf)
            .or_else(|| repo.path().parent().map(Path::to_path_buf))
    }

    /// Short name of the checked-out branch. `None` when HEAD is detached.
    pub fn branch(&self) -> Option<String> {
        let repo = self.repo.as_ref()?;
        repo.head_name()
            .ok()
            .flatten()
            .map(|name| name.shorten().to_string())
    }
}

/// Resolves project roots and branches through git discovery.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitResolver;

impl ProjectRootResolver for GitResolver {
    fn current_project_root(&self, cwd: &Path) -> Result<PathBuf> {
        Ok(GitClient::discover(cwd)
            .work_root()
            .unwrap_or_else(|| cwd.to_path_buf()))
    }
}

impl BranchResolver for GitResolver {
    fn current_branch(&self, root: &Path) -> Result<Option<String>> {
        Ok(GitClient::discover(root).branch())
    }
}
