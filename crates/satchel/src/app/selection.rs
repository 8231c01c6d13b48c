//! Resolving user selectors to satchel entries.

use std::path::Path;

use crate::app::scope::absolutize;
use crate::domain::errors::SatchelError;
use crate::domain::model::{Entry, Satchel};

/// Find the entry named by `raw`.
///
/// A selector is tried, in order, as a 1-based index, as a path relative to `cwd`, verbatim,
/// and finally as a suffix that matches exactly one entry on a path component boundary.
pub fn resolve<'a>(satchel: &'a Satchel, raw: &str, cwd: &Path) -> Result<&'a Entry, SatchelError> {
    let raw = raw.trim();
    if satchel.is_empty() {
        return Err(SatchelError::EmptySatchel);
    }

    if let Ok(index) = raw.parse::<usize>()
        && let Some(entry) = index.checked_sub(1).and_then(|i| satchel.entries().get(i))
    {
        return Ok(entry);
    }

    let absolute = absolutize(cwd, Path::new(raw));
    let absolute = absolute.to_string_lossy();
    if let Some(entry) = satchel
        .entries()
        .iter()
        .find(|entry| entry.as_str() == absolute || entry.as_str() == raw)
    {
        return Ok(entry);
    }

    let mut suffix_matches = satchel
        .entries()
        .iter()
        .filter(|entry| is_component_suffix(entry.as_str(), raw));
    match (suffix_matches.next(), suffix_matches.next()) {
        (Some(entry), None) => Ok(entry),
        _ => Err(SatchelError::UnknownSelection(raw.to_owned())),
    }
}

fn is_component_suffix(path: &str, suffix: &str) -> bool {
    if suffix.is_empty() {
        return false;
    }
    match path.strip_suffix(suffix) {
        Some(prefix) => prefix.is_empty() || prefix.ends_with('/') || suffix.starts_with('/'),
        None => false,
    }
}
