//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SatchelError {
    #[error("satchel is empty")]
    EmptySatchel,
    #[error("corrupt satchel store at {}: {}", .path.display(), .reason)]
    CorruptStore { path: PathBuf, reason: String },
    #[error("no satchel entry matches `{0}`")]
    UnknownSelection(String),
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}
