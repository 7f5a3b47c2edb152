//! Data models for pgconf-tune.
//!
//! - [`TuneSettings`]: operator settings layered from defaults, an optional YAML
//!   file, `PGCONF_TUNE_*` environment variables and command line flags
//! - [`SystemInfo`]: the resolved machine and server facts recommendations are
//!   computed from

pub mod settings;
pub mod system;

pub use settings::TuneSettings;
pub use system::SystemInfo;
