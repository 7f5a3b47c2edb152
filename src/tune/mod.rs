//! Recommended values for the settings pgconf-tune manages.
//!
//! Settings are organised in [`SettingsGroup`]s. Each group pairs its keys with
//! a [`Recommender`] and the [`ValueParser`] used to compare existing values
//! against recommendations.

pub mod memory;
pub mod misc;
pub mod parallel;
pub mod wal;

use crate::models::SystemInfo;
use crate::pgconf::{ConfError, PatternRegistry, Recommender, ValueParser};

pub use memory::{MEMORY_KEYS, MemoryRecommender};
pub use misc::{MISC_KEYS, MiscRecommender};
pub use parallel::{PARALLEL_KEYS, ParallelRecommender};
pub use wal::{WAL_KEYS, WalRecommender};

/// Bookkeeping setting recording when the file was last tuned.
pub const LAST_TUNED_KEY: &str = "timescaledb.last_tuned";

/// Bookkeeping setting recording the tool version that last tuned the file.
pub const LAST_TUNED_VERSION_KEY: &str = "timescaledb.last_tuned_version";

pub const BOOKKEEPING_KEYS: &[&str] = &[LAST_TUNED_KEY, LAST_TUNED_VERSION_KEY];

/// A named set of settings sharing one recommender and value parser.
pub struct SettingsGroup {
    pub label: &'static str,
    pub keys: &'static [&'static str],
    pub parser: ValueParser,
    pub recommender: Box<dyn Recommender>,
}

impl std::fmt::Debug for SettingsGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsGroup")
            .field("label", &self.label)
            .field("keys", &self.keys)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

/// The groups tuned on every run, in the order they are presented.
pub fn settings_groups(system: &SystemInfo) -> Vec<SettingsGroup> {
    vec![
        SettingsGroup {
            label: "memory",
            keys: MEMORY_KEYS,
            parser: ValueParser::Bytes,
            recommender: Box::new(MemoryRecommender::new(system)),
        },
        SettingsGroup {
            label: "parallelism",
            keys: PARALLEL_KEYS,
            parser: ValueParser::Decimal,
            recommender: Box::new(ParallelRecommender::new(system)),
        },
        SettingsGroup {
            label: "WAL",
            keys: WAL_KEYS,
            parser: ValueParser::Bytes,
            recommender: Box::new(WalRecommender::new(system)),
        },
        SettingsGroup {
            label: "miscellaneous",
            keys: MISC_KEYS,
            parser: ValueParser::Decimal,
            recommender: Box::new(MiscRecommender::new(system)),
        },
    ]
}

/// Every key a scan should recognize: group keys plus the quoted bookkeeping keys.
pub fn pattern_registry() -> Result<PatternRegistry, ConfError> {
    let plain = [MEMORY_KEYS, PARALLEL_KEYS, WAL_KEYS, MISC_KEYS].concat();
    PatternRegistry::from_keys(plain, BOOKKEEPING_KEYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgconf::units::GB;

    fn system() -> SystemInfo {
        SystemInfo {
            total_memory: 16 * GB,
            cpus: 8,
            pg_major: 16,
            max_connections: 100,
            max_bg_workers: 16,
            wal_disk_size: None,
        }
    }

    #[test]
    fn test_group_order() {
        let labels: Vec<&str> = settings_groups(&system()).iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["memory", "parallelism", "WAL", "miscellaneous"]);
    }

    #[test]
    fn test_every_group_key_is_recognized() {
        let registry = pattern_registry().unwrap();
        for group in settings_groups(&system()) {
            for key in group.keys {
                assert!(registry.get(key).is_some(), "{} not registered", key);
            }
        }
        for key in BOOKKEEPING_KEYS {
            assert!(registry.get(key).is_some());
        }
    }

    #[test]
    fn test_recommendations_parse_with_group_parser() {
        for group in settings_groups(&system()) {
            for key in group.keys {
                if let Some(value) = group.recommender.recommend(key) {
                    assert!(
                        group.parser.parse(&value).is_some(),
                        "{} = {} does not parse",
                        key,
                        value
                    );
                }
            }
        }
    }
}
