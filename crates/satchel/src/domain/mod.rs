//! Domain types for satchels, entries, and scope keys.

pub mod errors;
pub mod model;
