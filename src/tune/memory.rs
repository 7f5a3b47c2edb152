use crate::models::SystemInfo;
use crate::pgconf::Recommender;
use crate::pgconf::units::{GB, KB, format_bytes};

pub const SHARED_BUFFERS_KEY: &str = "shared_buffers";
pub const EFFECTIVE_CACHE_KEY: &str = "effective_cache_size";
pub const MAINTENANCE_WORK_MEM_KEY: &str = "maintenance_work_mem";
pub const WORK_MEM_KEY: &str = "work_mem";

pub const MEMORY_KEYS: &[&str] = &[
    SHARED_BUFFERS_KEY,
    EFFECTIVE_CACHE_KEY,
    MAINTENANCE_WORK_MEM_KEY,
    WORK_MEM_KEY,
];

const MAX_MAINTENANCE_WORK_MEM: u64 = 2 * GB;
const MIN_WORK_MEM: u64 = 64 * KB;

/// Memory settings, derived from total memory, connections and CPUs.
#[derive(Debug, Clone)]
pub struct MemoryRecommender {
    total_memory: u64,
    cpus: usize,
    max_connections: u64,
}

impl MemoryRecommender {
    pub fn new(system: &SystemInfo) -> Self {
        Self {
            total_memory: system.total_memory,
            cpus: system.cpus,
            max_connections: system.max_connections,
        }
    }

    /// A quarter of memory.
    pub fn shared_buffers(&self) -> u64 {
        self.total_memory / 4
    }

    fn work_mem(&self) -> u64 {
        let per_connection =
            (self.total_memory - self.shared_buffers()) / (self.max_connections.max(1) * 3);
        let gather_workers = self.cpus.div_ceil(2).max(1) as u64;
        (per_connection / gather_workers).max(MIN_WORK_MEM)
    }
}

impl Recommender for MemoryRecommender {
    fn is_available(&self) -> bool {
        self.total_memory > 0
    }

    fn recommend(&self, key: &str) -> Option<String> {
        let bytes = match key {
            SHARED_BUFFERS_KEY => self.shared_buffers(),
            EFFECTIVE_CACHE_KEY => self.total_memory / 4 * 3,
            MAINTENANCE_WORK_MEM_KEY => (self.total_memory / 20).min(MAX_MAINTENANCE_WORK_MEM),
            WORK_MEM_KEY => self.work_mem(),
            _ => return None,
        };
        Some(format_bytes(bytes))
    }
}
