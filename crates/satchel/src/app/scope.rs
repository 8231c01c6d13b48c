//! Scope resolution: which project root and branch a command operates on.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::domain::model::ScopeKey;

/// Returns the active version-control branch for a project root.
pub trait BranchResolver {
    fn current_branch(&self, root: &Path) -> Result<Option<String>>;
}

/// Returns the root directory of the project enclosing `cwd`.
pub trait ProjectRootResolver {
    fn current_project_root(&self, cwd: &Path) -> Result<PathBuf>;
}

/// Explicit inputs for scope resolution, threaded through each command.
#[derive(Debug, Clone, Default)]
pub struct ScopeContext {
    pub cwd: PathBuf,
    /// Replaces the project-root resolver when set.
    pub root_override: Option<PathBuf>,
    /// Replaces the branch resolver when set.
    pub branch_override: Option<String>,
    pub fallback_branch: String,
}

/// A resolved scope with the parts it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    pub root: PathBuf,
    pub branch: String,
    pub key: ScopeKey,
}

impl ScopeContext {
    pub fn resolve(
        &self,
        roots: &dyn ProjectRootResolver,
        branches: &dyn BranchResolver,
    ) -> Result<ResolvedScope> {
        let root = match &self.root_override {
            Some(root) => absolutize(&self.cwd, root),
            None => roots.current_project_root(&self.cwd)?,
        };

        let branch = match &self.branch_override {
            Some(branch) => branch.clone(),
            None => match branches.current_branch(&root)? {
                Some(branch) => branch,
                None => {
                    tracing::warn!(
                        root = %root.display(),
                        fallback = %self.fallback_branch,
                        "no current branch, using fallback"
                    );
                    self.fallback_branch.clone()
                }
            },
        };

        let key = ScopeKey::resolve(&root, &branch);
        tracing::debug!(root = %root.display(), branch = %branch, key = %key, "resolved scope");
        Ok(ResolvedScope { root, branch, key })
    }
}

/// Join a relative path onto `base` and lexically drop `.` and `..` components.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}
