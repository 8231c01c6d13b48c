//! Satchel persistence: one file per scope key inside the storage directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::domain::errors::SatchelError;
use crate::domain::model::{Satchel, ScopeKey};
use crate::infra::codec;

const SATCHEL_EXTENSION: &str = "eld";
const DEFAULT_DIRECTORY_FILE: &str = "default-directory.toml";
const MAX_FILE_NAME: usize = 255;
const KEY_HASH_BYTES: usize = 16;

/// Persisted `set-default-directory` choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct DefaultDirectoryRecord {
    directory: PathBuf,
}

/// Reads and writes satchels under a storage directory.
#[derive(Debug, Clone)]
pub struct SatchelStore {
    dir: PathBuf,
}

impl SatchelStore {
    /// Create a store rooted at the provided directory. Nothing is created until a save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Location of the file backing `key`.
    pub fn path_for(&self, key: &ScopeKey) -> PathBuf {
        self.dir.join(file_name(key))
    }

    /// Load the satchel for `key`. A scope that was never saved yields an empty satchel.
    pub fn load(&self, key: &ScopeKey) -> Result<Satchel> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Satchel::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read satchel file at {}", path.display()));
            }
        };

        let text = String::from_utf8(bytes).map_err(|err| SatchelError::CorruptStore {
            path: path.clone(),
            reason: format!("invalid UTF-8 at byte {}", err.utf8_error().valid_up_to()),
        })?;
        let entries = codec::decode(&text).map_err(|err| SatchelError::CorruptStore {
            path: path.clone(),
            reason: err.to_string(),
        })?;

        let found = entries.len();
        let satchel = Satchel::from_entries(entries);
        if satchel.len() != found {
            tracing::warn!(
                path = %path.display(),
                duplicates = found - satchel.len(),
                "collapsed duplicate satchel entries"
            );
        }
        Ok(satchel)
    }

    /// Persist `satchel` for `key`, replacing the previous file atomically. Saving an empty
    /// satchel removes the file.
    pub fn save(&self, key: &ScopeKey, satchel: &Satchel) -> Result<()> {
        if satchel.is_empty() {
            return self.burn(key);
        }

        let path = self.path_for(key);
        write_atomic(&self.dir, &path, codec::encode(satchel.entries()).as_bytes())?;
        tracing::info!(path = %path.display(), entries = satchel.len(), "saved satchel");
        Ok(())
    }

    /// Delete the satchel for `key`. Missing files are not an error.
    pub fn burn(&self, key: &ScopeKey) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "burned satchel");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to remove satchel file at {}", path.display())),
        }
    }

    /// The directory recorded by `set-default-directory`, if any.
    pub fn default_directory(&self) -> Result<Option<PathBuf>> {
        let path = self.dir.join(DEFAULT_DIRECTORY_FILE);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let record: DefaultDirectoryRecord = toml::from_str(&data)
            .with_context(|| format!("invalid default directory state in {}", path.display()))?;
        Ok(Some(record.directory))
    }

    /// Record `directory` as the scope root for later commands, or clear it with `None`.
    pub fn set_default_directory(&self, directory: Option<&Path>) -> Result<()> {
        let path = self.dir.join(DEFAULT_DIRECTORY_FILE);
        match directory {
            Some(directory) => {
                let record = DefaultDirectoryRecord {
                    directory: directory.to_path_buf(),
                };
                let data = toml::to_string(&record)
                    .context("failed to serialize default directory state")?;
                write_atomic(&self.dir, &path, data.as_bytes())
            }
            None => match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => {
                    Err(err).with_context(|| format!("failed to remove {}", path.display()))
                }
            },
        }
    }
}

/// `{key}.eld`, or a truncated key plus a digest of the whole key when that would not fit in
/// one path component.
fn file_name(key: &ScopeKey) -> String {
    let plain = format!("{key}.{SATCHEL_EXTENSION}");
    if plain.len() <= MAX_FILE_NAME {
        return plain;
    }

    let key = key.as_str();
    let digest = Sha256::digest(key.as_bytes());
    let hash = hex::encode(&digest[..KEY_HASH_BYTES]);
    let mut end = MAX_FILE_NAME - hash.len() - SATCHEL_EXTENSION.len() - 2;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}-{hash}.{SATCHEL_EXTENSION}", &key[..end])
}

fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create storage directory {}", dir.display()))?;

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    temp.write_all(contents)
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
