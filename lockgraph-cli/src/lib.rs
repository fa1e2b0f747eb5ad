//! lockgraph-cli library
//!
//! Argument parsing, command handlers and output rendering for the
//! `lockgraph` binary. Exposed as a library so integration tests can drive
//! the commands without spawning a process.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
