// pgconf-tune - Tune a PostgreSQL configuration file for TimescaleDB
//
// This is the library crate containing the configuration-state engine, the
// recommenders and the services around them.
// The binary crate (main.rs) provides the command line entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod pgconf;
pub mod services;
pub mod tune;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{SystemInfo, TuneSettings};
pub use pgconf::{ConfError, ConfigFileState, PatternRegistry};
pub use services::{TuneReport, Tuner};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
