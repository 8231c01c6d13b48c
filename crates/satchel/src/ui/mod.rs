//! Terminal interaction for commands that need a selection.

pub mod prompt;
