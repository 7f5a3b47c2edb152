use crate::models::SystemInfo;
use crate::pgconf::Recommender;

pub const MAX_BG_WORKERS_KEY: &str = "timescaledb.max_background_workers";
pub const MAX_WORKER_PROCESSES_KEY: &str = "max_worker_processes";
pub const MAX_PARALLEL_PER_GATHER_KEY: &str = "max_parallel_workers_per_gather";
pub const MAX_PARALLEL_WORKERS_KEY: &str = "max_parallel_workers";

pub const PARALLEL_KEYS: &[&str] = &[
    MAX_BG_WORKERS_KEY,
    MAX_WORKER_PROCESSES_KEY,
    MAX_PARALLEL_PER_GATHER_KEY,
    MAX_PARALLEL_WORKERS_KEY,
];

/// Workers Postgres needs beyond background and parallel workers.
const RESERVED_WORKERS: u64 = 3;

/// Worker and parallelism settings. Only meaningful with more than one CPU.
#[derive(Debug, Clone)]
pub struct ParallelRecommender {
    cpus: u64,
    max_bg_workers: u64,
}

impl ParallelRecommender {
    pub fn new(system: &SystemInfo) -> Self {
        Self {
            cpus: system.cpus as u64,
            max_bg_workers: system.max_bg_workers,
        }
    }
}

impl Recommender for ParallelRecommender {
    fn is_available(&self) -> bool {
        self.cpus > 1
    }

    fn recommend(&self, key: &str) -> Option<String> {
        let value = match key {
            MAX_BG_WORKERS_KEY => self.max_bg_workers,
            MAX_WORKER_PROCESSES_KEY => self.max_bg_workers + self.cpus + RESERVED_WORKERS,
            MAX_PARALLEL_PER_GATHER_KEY => self.cpus.div_ceil(2),
            MAX_PARALLEL_WORKERS_KEY => self.cpus,
            _ => return None,
        };
        Some(value.to_string())
    }
}
