//! Storage infrastructure: configuration file persistence.
//!
//! A thin adapter between the application and the file system.  The `config`
//! sub-module reads the TOML configuration file from the platform-appropriate
//! directory, writes changes back, and supplies sensible defaults on first
//! run when no file exists yet.

pub mod config;
