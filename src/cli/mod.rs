//! CLI command definitions and dispatch

pub mod args;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;
