//! Utilities shared by the CLI and the library modules.

pub mod cli;
pub mod paths;
pub mod workspace;
