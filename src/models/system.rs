/// Facts about the machine and server that recommendations are computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// Memory available to Postgres, in bytes.
    pub total_memory: u64,
    pub cpus: usize,
    pub pg_major: u32,
    pub max_connections: u64,
    pub max_bg_workers: u64,
    /// Size of the WAL disk in bytes, when known.
    pub wal_disk_size: Option<u64>,
}
