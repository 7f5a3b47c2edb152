//! Services module - everything around the configuration-state engine that
//! touches the operator or the machine.
//!
//! # Components
//!
//! - [`Tuner`]: walks through the shared library line, each settings group and
//!   the bookkeeping settings, confirming each change via a [`Prompter`]
//! - [`discovery`]: finds `postgresql.conf` through an injected [`FileSystem`]
//! - [`BackupManager`]: timestamped copies of the file before it is rewritten,
//!   and restoring the latest one
//! - [`system`]: detects memory and CPUs when settings do not provide them
//!
//! The engine itself ([`crate::pgconf`]) stays free of I/O policy and logging;
//! this layer adds both.

pub mod backup;
pub mod discovery;
pub mod prompt;
pub mod system;
pub mod tuner;

pub use backup::BackupManager;
pub use discovery::{DiscoveryError, FileSystem, OsFileSystem, Platform, find_conf_path};
pub use prompt::{AutoAccept, Prompter, TerminalPrompter};
pub use system::resolve_system;
pub use tuner::{TuneReport, Tuner, write_dry_run};
