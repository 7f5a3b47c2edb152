use crate::models::SystemInfo;
use crate::pgconf::Recommender;
use crate::pgconf::units::{GB, KB, MB, format_bytes};

pub const WAL_BUFFERS_KEY: &str = "wal_buffers";
pub const MIN_WAL_KEY: &str = "min_wal_size";
pub const MAX_WAL_KEY: &str = "max_wal_size";

pub const WAL_KEYS: &[&str] = &[WAL_BUFFERS_KEY, MIN_WAL_KEY, MAX_WAL_KEY];

const MIN_WAL_BUFFERS: u64 = 64 * KB;
const MAX_WAL_BUFFERS: u64 = 16 * MB;
const DEFAULT_MAX_WAL: u64 = GB;

/// Write-ahead log sizing.
#[derive(Debug, Clone)]
pub struct WalRecommender {
    shared_buffers: u64,
    wal_disk_size: Option<u64>,
}

impl WalRecommender {
    pub fn new(system: &SystemInfo) -> Self {
        Self {
            shared_buffers: system.total_memory / 4,
            wal_disk_size: system.wal_disk_size,
        }
    }

    /// 60% of the WAL disk, at least 1GB, in whole megabytes.
    fn max_wal_size(&self) -> u64 {
        match self.wal_disk_size {
            Some(disk) => (disk / 10 * 6 / MB * MB).max(DEFAULT_MAX_WAL),
            None => DEFAULT_MAX_WAL,
        }
    }
}

impl Recommender for WalRecommender {
    fn is_available(&self) -> bool {
        true
    }

    fn recommend(&self, key: &str) -> Option<String> {
        let bytes = match key {
            WAL_BUFFERS_KEY => (self.shared_buffers / 32).clamp(MIN_WAL_BUFFERS, MAX_WAL_BUFFERS),
            MIN_WAL_KEY => self.max_wal_size() / 2,
            MAX_WAL_KEY => self.max_wal_size(),
            _ => return None,
        };
        Some(format_bytes(bytes))
    }
}
