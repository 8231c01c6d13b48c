//! Infrastructure adapters for storage encoding, git, config, and external programs.

pub mod codec;
pub mod config;
pub mod git;
pub mod opener;
