use crate::models::SystemInfo;
use crate::pgconf::Recommender;

pub const STATS_TARGET_KEY: &str = "default_statistics_target";
pub const RANDOM_PAGE_COST_KEY: &str = "random_page_cost";
pub const CHECKPOINT_TARGET_KEY: &str = "checkpoint_completion_target";
pub const MAX_CONNECTIONS_KEY: &str = "max_connections";
pub const MAX_LOCKS_KEY: &str = "max_locks_per_transaction";
pub const AUTOVACUUM_WORKERS_KEY: &str = "autovacuum_max_workers";
pub const AUTOVACUUM_NAPTIME_KEY: &str = "autovacuum_naptime";
pub const IO_CONCURRENCY_KEY: &str = "effective_io_concurrency";

pub const MISC_KEYS: &[&str] = &[
    STATS_TARGET_KEY,
    RANDOM_PAGE_COST_KEY,
    CHECKPOINT_TARGET_KEY,
    MAX_CONNECTIONS_KEY,
    MAX_LOCKS_KEY,
    AUTOVACUUM_WORKERS_KEY,
    AUTOVACUUM_NAPTIME_KEY,
    IO_CONCURRENCY_KEY,
];

/// From this major version on, 0.9 is the server default.
const CHECKPOINT_DEFAULT_SINCE: u32 = 14;

/// Planner, checkpoint, lock and autovacuum settings.
#[derive(Debug, Clone)]
pub struct MiscRecommender {
    pg_major: u32,
    max_connections: u64,
}

impl MiscRecommender {
    pub fn new(system: &SystemInfo) -> Self {
        Self {
            pg_major: system.pg_major,
            max_connections: system.max_connections,
        }
    }
}

impl Recommender for MiscRecommender {
    fn is_available(&self) -> bool {
        true
    }

    fn recommend(&self, key: &str) -> Option<String> {
        let value = match key {
            STATS_TARGET_KEY => "100",
            RANDOM_PAGE_COST_KEY => "1.1",
            CHECKPOINT_TARGET_KEY if self.pg_major >= CHECKPOINT_DEFAULT_SINCE => return None,
            CHECKPOINT_TARGET_KEY => "0.9",
            MAX_CONNECTIONS_KEY => return Some(self.max_connections.to_string()),
            MAX_LOCKS_KEY => "256",
            AUTOVACUUM_WORKERS_KEY => "10",
            AUTOVACUUM_NAPTIME_KEY => "10",
            IO_CONCURRENCY_KEY => "256",
            _ => return None,
        };
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(pg_major: u32) -> SystemInfo {
        SystemInfo {
            total_memory: 0,
            cpus: 1,
            pg_major,
            max_connections: 50,
            max_bg_workers: 16,
            wal_disk_size: None,
        }
    }

    #[test]
    fn test_fixed_values() {
        let rec = MiscRecommender::new(&system(16));
        assert_eq!(rec.recommend(RANDOM_PAGE_COST_KEY).unwrap(), "1.1");
        assert_eq!(rec.recommend(MAX_CONNECTIONS_KEY).unwrap(), "50");
        assert_eq!(rec.recommend(IO_CONCURRENCY_KEY).unwrap(), "256");
    }

    #[test]
    fn test_checkpoint_target_depends_on_version() {
        assert_eq!(
            MiscRecommender::new(&system(13))
                .recommend(CHECKPOINT_TARGET_KEY)
                .unwrap(),
            "0.9"
        );
        assert_eq!(
            MiscRecommender::new(&system(14)).recommend(CHECKPOINT_TARGET_KEY),
            None
        );
    }
}
