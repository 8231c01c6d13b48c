//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use dirs_next::{config_dir, data_dir, home_dir};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".satchel/config.toml";
static DEFAULT_FALLBACK_BRANCH: &str = "detached";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub open: Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Storage {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Storage {
    /// Directory holding one file per scope key.
    pub fn directory(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(directory) => Ok(directory.clone()),
            None => data_dir()
                .map(|base| base.join("satchel"))
                .ok_or_else(|| anyhow!("unable to determine a data directory for satchel storage")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Scope {
    #[serde(default)]
    pub default_directory: Option<PathBuf>,
    #[serde(default)]
    fallback_branch: Option<String>,
}

impl Scope {
    /// Branch name used when the project has no resolvable branch.
    pub fn fallback_branch(&self) -> String {
        self.fallback_branch
            .clone()
            .unwrap_or_else(|| DEFAULT_FALLBACK_BRANCH.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Open {
    /// Program and leading arguments used to open an entry; the path is appended.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    storage_dir: Option<PathBuf>,
    fallback_branch: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            storage_dir: env::var_os("SATCHEL_STORAGE_DIR").map(PathBuf::from),
            fallback_branch: env::var("SATCHEL_FALLBACK_BRANCH").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(storage_dir: &str, fallback_branch: &str) -> Self {
        Self {
            storage_dir: Some(PathBuf::from(storage_dir)),
            fallback_branch: Some(fallback_branch.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    ///
    /// The workspace layer is `.satchel/config.toml` at the repository enclosing `dir`, or at
    /// `dir` itself outside a repository.
    pub fn load(dir: &Path) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = Some(workspace_config_path(dir));
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        let mut config = apply_env_overrides(merged, env_overrides);
        config.storage.directory = config.storage.directory.map(expand_home);
        config.scope.default_directory = config.scope.default_directory.map(expand_home);
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            storage: Storage {
                directory: other.storage.directory.or(self.storage.directory),
            },
            scope: Scope {
                default_directory: other.scope.default_directory.or(self.scope.default_directory),
                fallback_branch: other.scope.fallback_branch.or(self.scope.fallback_branch),
            },
            open: Open {
                command: other.open.command.or(self.open.command),
            },
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os("SATCHEL_CONFIG") {
        return Some(PathBuf::from(explicit));
    }
    config_dir().map(|base| base.join("satchel/config.toml"))
}

fn workspace_config_path(cwd: &Path) -> PathBuf {
    let root = find_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
    root.join(DEFAULT_WORKSPACE_CONFIG_PATH)
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| candidate.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Replace a leading `~` component with the home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match home_dir() {
        Some(home) => home.join(rest),
        None => path,
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(storage_dir) = env.storage_dir {
        config.storage.directory = Some(storage_dir);
    }
    if let Some(fallback_branch) = env.fallback_branch {
        config.scope.fallback_branch = Some(fallback_branch);
    }
    config
}
