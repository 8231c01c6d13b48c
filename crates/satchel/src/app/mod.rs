//! Application layer orchestrating domain logic and infrastructure.

pub mod actions;
pub mod scope;
pub mod selection;
pub mod store;
