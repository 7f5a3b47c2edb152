//! Configuration-state engine for `postgresql.conf`.
//!
//! The file is held as an ordered list of [`Line`]s. A scan with a
//! [`PatternRegistry`] records, per setting key, the last line that sets it
//! ([`TunableParseResult`]) and the `shared_preload_libraries` line
//! ([`SharedLibResult`]). Callers rewrite or append lines, optionally run a
//! [`LineProcessor`] pipeline (e.g. [`DuplicateRemover`]), and write the result
//! back with [`ConfigFileState::write_to`] or
//! [`ConfigFileState::write_truncating`].
//!
//! Only the anchored `key = value [# comment]` shape is understood; every other
//! line is carried through untouched.
//!
//! This module does no logging; errors are returned to the caller.

pub mod error;
pub mod line;
pub mod parse;
pub mod patterns;
pub mod processors;
pub mod state;
pub mod units;
pub mod visibility;
pub mod writer;

pub use error::ConfError;
pub use line::{Line, SharedLibResult, TunableParseResult};
pub use parse::{parse_shared_lib_line, parse_tunable_line};
pub use patterns::{
    EXTENSION_NAME, PatternRegistry, SHARED_LIB_KEY, quoted_tunable_pattern, shared_lib_pattern,
    tunable_pattern,
};
pub use processors::{DuplicateRemover, LineProcessor, process_lines};
pub use state::ConfigFileState;
pub use visibility::{FUDGE_FACTOR, Recommender, ValueParser, compute_visible_keys};
pub use writer::Truncate;
