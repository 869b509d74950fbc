//! Command-line interface for discog-mediator.
//!
//! This module provides CLI commands for searching providers, browsing
//! artists and labels, previewing releases, and importing them.

mod commands;

pub use commands::{Cli, Commands, run_command};
