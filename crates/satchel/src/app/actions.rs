//! User-facing satchel actions. Each call is one load, mutate, save cycle.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::app::scope::{ResolvedScope, absolutize};
use crate::app::selection;
use crate::app::store::SatchelStore;
use crate::domain::errors::SatchelError;
use crate::domain::model::{Entry, Satchel};

/// Result of placing a path into the satchel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Added(Entry),
    AlreadyPresent(Entry),
}

/// Actions bound to one resolved scope.
#[derive(Debug, Clone)]
pub struct Satchels {
    store: SatchelStore,
    scope: ResolvedScope,
    cwd: PathBuf,
}

impl Satchels {
    pub fn new(store: SatchelStore, scope: ResolvedScope, cwd: impl Into<PathBuf>) -> Self {
        Self {
            store,
            scope,
            cwd: cwd.into(),
        }
    }

    pub fn scope(&self) -> &ResolvedScope {
        &self.scope
    }

    pub fn store(&self) -> &SatchelStore {
        &self.store
    }

    /// The satchel for the current scope.
    pub fn current(&self) -> Result<Satchel> {
        self.store.load(&self.scope.key)
    }

    /// Append each path, absolutized against the working directory, unless already present.
    /// Nothing is saved when no path is new or any path is rejected.
    pub fn place<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Placement>> {
        let entries = paths
            .iter()
            .map(|path| self.entry_for(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut satchel = self.current()?;
        let mut placements = Vec::with_capacity(entries.len());
        for entry in entries {
            if satchel.contains(&entry) {
                placements.push(Placement::AlreadyPresent(entry));
            } else {
                satchel = satchel.add(entry.clone());
                placements.push(Placement::Added(entry));
            }
        }

        if placements.iter().any(|p| matches!(p, Placement::Added(_))) {
            self.store.save(&self.scope.key, &satchel)?;
        }
        Ok(placements)
    }

    /// Resolve the entry to open. `choose` supplies a selector and may cancel with `None`.
    pub fn pick<F>(&self, choose: F) -> Result<Option<Entry>>
    where
        F: FnOnce(&Satchel) -> Result<Option<String>>,
    {
        let satchel = self.non_empty()?;
        select(&satchel, &self.cwd, choose)
    }

    /// The front entry.
    pub fn lucky(&self) -> Result<Entry> {
        let satchel = self.current()?;
        satchel
            .pick_default()
            .cloned()
            .ok_or_else(|| SatchelError::EmptySatchel.into())
    }

    pub fn drop_entry<F>(&self, choose: F) -> Result<Option<Entry>>
    where
        F: FnOnce(&Satchel) -> Result<Option<String>>,
    {
        self.rearrange(choose, |satchel, entry| satchel.remove(entry))
    }

    pub fn promote<F>(&self, choose: F) -> Result<Option<Entry>>
    where
        F: FnOnce(&Satchel) -> Result<Option<String>>,
    {
        self.rearrange(choose, |satchel, entry| satchel.promote(entry.clone()))
    }

    pub fn demote<F>(&self, choose: F) -> Result<Option<Entry>>
    where
        F: FnOnce(&Satchel) -> Result<Option<String>>,
    {
        self.rearrange(choose, |satchel, entry| satchel.demote(entry.clone()))
    }

    /// Delete the satchel for the current scope.
    pub fn burn(&self) -> Result<()> {
        self.store.burn(&self.scope.key)
    }

    fn entry_for(&self, path: &Path) -> Result<Entry, SatchelError> {
        let absolute = absolutize(&self.cwd, path);
        match absolute.to_str() {
            Some(path) => Ok(Entry::new(path)),
            None => Err(SatchelError::NonUtf8Path(absolute)),
        }
    }

    fn non_empty(&self) -> Result<Satchel> {
        let satchel = self.current()?;
        if satchel.is_empty() {
            return Err(SatchelError::EmptySatchel.into());
        }
        Ok(satchel)
    }

    fn rearrange<F, M>(&self, choose: F, mutate: M) -> Result<Option<Entry>>
    where
        F: FnOnce(&Satchel) -> Result<Option<String>>,
        M: FnOnce(Satchel, &Entry) -> Satchel,
    {
        let satchel = self.non_empty()?;
        let Some(entry) = select(&satchel, &self.cwd, choose)? else {
            return Ok(None);
        };

        let satchel = mutate(satchel, &entry);
        self.store.save(&self.scope.key, &satchel)?;
        Ok(Some(entry))
    }
}

fn select<F>(satchel: &Satchel, cwd: &Path, choose: F) -> Result<Option<Entry>>
where
    F: FnOnce(&Satchel) -> Result<Option<String>>,
{
    match choose(satchel)? {
        Some(raw) => Ok(Some(selection::resolve(satchel, &raw, cwd)?.clone())),
        None => Ok(None),
    }
}
