//! Domain models for satchel entries, ordered satchels, and scope keys.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// A single absolute file path tracked by a satchel. Compared by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Entry(String);

impl Entry {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Ordered list of unique entries. The front entry is the most important one.
///
/// Every operation consumes the satchel and returns the transformed list, so a command is always
/// an explicit load, mutate, save cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Satchel {
    entries: Vec<Entry>,
}

impl Satchel {
    /// Create an empty satchel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a satchel from entries, keeping the first occurrence of any duplicate.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        entries.into_iter().fold(Self::new(), Self::add)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.contains(entry)
    }

    pub fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Append `entry` unless it is already present. Existing entries never move.
    pub fn add(mut self, entry: Entry) -> Self {
        if !self.contains(&entry) {
            self.entries.push(entry);
        }
        self
    }

    /// Remove `entry` if present.
    pub fn remove(mut self, entry: &Entry) -> Self {
        if let Some(index) = self.position(entry) {
            self.entries.remove(index);
        }
        self
    }

    /// Move `entry` to the front, prepending it when absent.
    pub fn promote(self, entry: Entry) -> Self {
        let mut satchel = self.remove(&entry);
        satchel.entries.insert(0, entry);
        satchel
    }

    /// Move `entry` to the back, appending it when absent.
    pub fn demote(self, entry: Entry) -> Self {
        let mut satchel = self.remove(&entry);
        satchel.entries.push(entry);
        satchel
    }

    /// The entry a "feeling lucky" pick opens.
    pub fn pick_default(&self) -> Option<&Entry> {
        self.first()
    }

    fn position(&self, entry: &Entry) -> Option<usize> {
        self.entries.iter().position(|existing| existing == entry)
    }
}

impl<'a> IntoIterator for &'a Satchel {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Storage identifier derived from a project root and a branch name.
///
/// Both parts are escaped before separators are substituted, so distinct `(root, branch)` pairs
/// never produce the same key and `#` only ever appears as the joining separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScopeKey(String);

const SCOPE_SEPARATOR: char = '#';

impl ScopeKey {
    pub fn resolve(root: &Path, branch: &str) -> Self {
        let root = root.to_string_lossy();
        let root = trim_trailing_separators(&root);
        Self(format!(
            "{}{SCOPE_SEPARATOR}{}",
            normalize_component(root),
            normalize_component(branch)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn trim_trailing_separators(root: &str) -> &str {
    let trimmed = root.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() { root } else { trimmed }
}

fn normalize_component(value: &str) -> String {
    let mut normalized = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '%' => normalized.push_str("%25"),
            '#' => normalized.push_str("%23"),
            ':' => normalized.push_str("%3A"),
            '/' => normalized.push_str("%2F"),
            '\\' => normalized.push_str("%5C"),
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn satchel(paths: &[&str]) -> Satchel {
        Satchel::from_entries(paths.iter().copied().map(Entry::from))
    }

    #[test]
    fn add_appends_absent_entry() {
        let before = satchel(&["/p/a", "/p/b"]);
        let after = before.clone().add("/p/c".into());

        assert!(after.contains(&"/p/c".into()));
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after.last(), Some(&Entry::from("/p/c")));
    }

    #[test]
    fn add_existing_entry_is_identity() {
        let before = satchel(&["/p/a", "/p/b"]);
        assert_eq!(before.clone().add("/p/a".into()), before);
    }

    #[test]
    fn remove_drops_present_entry() {
        let before = satchel(&["/p/a", "/p/b", "/p/c"]);
        let after = before.clone().remove(&"/p/b".into());

        assert!(!after.contains(&"/p/b".into()));
        assert_eq!(after.len(), before.len() - 1);
        assert_eq!(after, satchel(&["/p/a", "/p/c"]));
    }

    #[test]
    fn remove_absent_entry_is_noop() {
        let before = satchel(&["/p/a"]);
        assert_eq!(before.clone().remove(&"/p/z".into()), before);
    }

    #[test]
    fn promote_moves_entry_to_front() {
        let after = satchel(&["/p/a", "/p/b", "/p/c"]).promote("/p/c".into());
        assert_eq!(after, satchel(&["/p/c", "/p/a", "/p/b"]));
    }

    #[test]
    fn demote_moves_entry_to_back() {
        let after = satchel(&["/p/a", "/p/b", "/p/c"]).demote("/p/a".into());
        assert_eq!(after, satchel(&["/p/b", "/p/c", "/p/a"]));
    }

    #[test]
    fn promote_and_demote_insert_absent_entries() {
        let promoted = satchel(&["/p/a"]).promote("/p/new".into());
        assert_eq!(promoted, satchel(&["/p/new", "/p/a"]));

        let demoted = satchel(&["/p/a"]).demote("/p/new".into());
        assert_eq!(demoted, satchel(&["/p/a", "/p/new"]));
    }

    #[test]
    fn pick_default_returns_front() {
        assert_eq!(Satchel::new().pick_default(), None);
        assert_eq!(
            satchel(&["/p/a", "/p/b"]).pick_default(),
            Some(&Entry::from("/p/a"))
        );
    }

    #[test]
    fn from_entries_collapses_duplicates() {
        let collapsed = satchel(&["/p/a", "/p/b", "/p/a"]);
        assert_eq!(collapsed.entries(), &[Entry::from("/p/a"), Entry::from("/p/b")]);
    }

    #[test]
    fn scenario_add_promote_remove() {
        let s = Satchel::new()
            .add("/proj/a.txt".into())
            .add("/proj/b.txt".into());
        assert_eq!(s, satchel(&["/proj/a.txt", "/proj/b.txt"]));

        let s = s.promote("/proj/b.txt".into());
        assert_eq!(s, satchel(&["/proj/b.txt", "/proj/a.txt"]));
        assert_eq!(s.pick_default().map(Entry::as_str), Some("/proj/b.txt"));

        let s = s.remove(&"/proj/a.txt".into());
        assert_eq!(s, satchel(&["/proj/b.txt"]));
    }

    #[test]
    fn scope_key_joins_normalized_parts() {
        let key = ScopeKey::resolve(Path::new("/proj/app/"), "feature/login");
        assert_eq!(key.as_str(), "%2Fproj%2Fapp#feature%2Flogin");
    }

    #[test]
    fn scope_key_is_deterministic() {
        let a = ScopeKey::resolve(Path::new("/proj"), "main");
        let b = ScopeKey::resolve(Path::new("/proj"), "main");
        assert_eq!(a, b);
    }

    #[test]
    fn scope_key_distinguishes_branches_and_roots() {
        let main = ScopeKey::resolve(Path::new("/proj"), "main");
        let dev = ScopeKey::resolve(Path::new("/proj"), "dev");
        let other = ScopeKey::resolve(Path::new("/other"), "main");
        assert_ne!(main, dev);
        assert_ne!(main, other);
    }

    #[test]
    fn scope_key_escapes_delimiter_lookalikes() {
        let nested = ScopeKey::resolve(Path::new("/a/b"), "x");
        let literal = ScopeKey::resolve(Path::new("/a%2Fb"), "x");
        assert_ne!(nested, literal);

        let split_root = ScopeKey::resolve(Path::new("/a#b"), "c");
        let split_branch = ScopeKey::resolve(Path::new("/a"), "b#c");
        assert_ne!(split_root, split_branch);
    }

    #[test]
    fn scope_key_keeps_filesystem_root() {
        let key = ScopeKey::resolve(Path::new("/"), "main");
        assert_eq!(key.as_str(), "%2F#main");
    }
}
