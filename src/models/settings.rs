use crate::pgconf::units::parse_bytes;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Operator settings for a tuning run.
///
/// Every field has a default so a partial settings file or a handful of
/// environment variables is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneSettings {
    /// Explicit path to `postgresql.conf`; discovered when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf_path: Option<String>,

    /// Write the result here instead of back to `conf_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_path: Option<String>,

    /// Postgres version, major or `major.minor`.
    #[serde(default = "default_pg_version")]
    pub pg_version: String,

    /// Memory to tune for, in Postgres notation (e.g. `8GB`); detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    /// CPUs to tune for; detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<usize>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u64,

    #[serde(default = "default_max_bg_workers")]
    pub max_bg_workers: u64,

    /// Size of the disk holding the WAL, in Postgres notation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wal_disk_size: Option<String>,

    /// Where backups go; the system temp directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<String>,

    /// Also log to daily rolling files in this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Accept every recommendation without prompting.
    #[serde(default)]
    pub yes: bool,

    /// Print less.
    #[serde(default)]
    pub quiet: bool,

    /// Print the resulting file instead of writing it.
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for TuneSettings {
    fn default() -> Self {
        Self {
            conf_path: None,
            out_path: None,
            pg_version: default_pg_version(),
            memory: None,
            cpus: None,
            max_connections: default_max_connections(),
            max_bg_workers: default_max_bg_workers(),
            wal_disk_size: None,
            backup_dir: None,
            log_dir: None,
            yes: false,
            quiet: false,
            dry_run: false,
            debug: false,
        }
    }
}

fn default_pg_version() -> String {
    "16".to_string()
}

fn default_max_connections() -> u64 {
    100
}

fn default_max_bg_workers() -> u64 {
    16
}

impl TuneSettings {
    /// Major version parsed from `pg_version` (`"16.2"` → 16).
    pub fn pg_major(&self) -> Result<u32> {
        let major = self.pg_version.split('.').next().unwrap_or_default();
        major
            .trim()
            .parse()
            .with_context(|| format!("Invalid Postgres version: {:?}", self.pg_version))
    }

    /// `memory` in bytes, if set.
    pub fn memory_bytes(&self) -> Result<Option<u64>> {
        self.memory
            .as_deref()
            .map(|m| parse_size("memory", m))
            .transpose()
    }

    /// `wal_disk_size` in bytes, if set.
    pub fn wal_disk_bytes(&self) -> Result<Option<u64>> {
        self.wal_disk_size
            .as_deref()
            .map(|m| parse_size("wal_disk_size", m))
            .transpose()
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<()> {
        self.pg_major()?;
        self.memory_bytes()?;
        self.wal_disk_bytes()?;
        if self.max_connections == 0 {
            bail!("max_connections must be at least 1");
        }
        if self.cpus == Some(0) {
            bail!("cpus must be at least 1");
        }
        Ok(())
    }
}

fn parse_size(field: &str, value: &str) -> Result<u64> {
    match parse_bytes(value) {
        Some(bytes) if bytes >= 1.0 => Ok(bytes as u64),
        _ => bail!("Invalid {}: {:?} (expected a size such as 8GB)", field, value),
    }
}
