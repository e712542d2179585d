//! Storage infrastructure: configuration file persistence.
//!
//! This module provides a thin adapter between the agent and the file system.
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate directory.
//! - Writing a default file on first run so the user has something to edit.
//! - Turning the symbolic `[media]` and `[keys]` tables into the engine's
//!   immutable key map, dropping entries that do not parse.

pub mod config;
