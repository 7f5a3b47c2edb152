use crate::models::{SystemInfo, TuneSettings};
use crate::pgconf::units::KB;
use anyhow::{Context, Result, bail};

/// Total memory from `/proc/meminfo` contents, in bytes.
pub fn parse_meminfo(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let mut fields = line.split_whitespace().skip(1);
    let amount: u64 = fields.next()?.parse().ok()?;
    match fields.next() {
        Some("kB") => Some(amount * KB),
        None => Some(amount),
        Some(_) => None,
    }
}

/// Total memory of this machine.
pub fn detect_memory() -> Result<u64> {
    if !cfg!(target_os = "linux") {
        bail!("Cannot detect memory on this platform, pass --memory");
    }
    let meminfo =
        std::fs::read_to_string("/proc/meminfo").context("Failed to read /proc/meminfo")?;
    parse_meminfo(&meminfo).context("No MemTotal entry in /proc/meminfo")
}

/// Logical CPUs available to this process.
pub fn detect_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Combine settings with detected values; settings take precedence.
pub fn resolve_system(settings: &TuneSettings) -> Result<SystemInfo> {
    resolve_system_with(settings, detect_memory, detect_cpus)
}

/// [`resolve_system`] with injected detectors. A detector is only called when
/// the corresponding setting is absent.
pub fn resolve_system_with<M, C>(
    settings: &TuneSettings,
    detect_memory: M,
    detect_cpus: C,
) -> Result<SystemInfo>
where
    M: FnOnce() -> Result<u64>,
    C: FnOnce() -> usize,
{
    let total_memory = match settings.memory_bytes()? {
        Some(bytes) => bytes,
        None => detect_memory()?,
    };
    let cpus = settings.cpus.unwrap_or_else(detect_cpus);

    let system = SystemInfo {
        total_memory,
        cpus,
        pg_major: settings.pg_major()?,
        max_connections: settings.max_connections,
        max_bg_workers: settings.max_bg_workers,
        wal_disk_size: settings.wal_disk_bytes()?,
    };
    tracing::debug!("Resolved system: {:?}", system);
    Ok(system)
}
