use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDateTime;
use std::fs;

/// File name prefix of every backup; the timestamp follows.
pub const BACKUP_PREFIX: &str = "timescaledb_tune.backup";

const BACKUP_TIME_FORMAT: &str = "%Y%m%d%H%M";

/// Copies of the configuration file taken before it is rewritten.
///
/// Backups are named `timescaledb_tune.backup<YYYYMMDDHHMM>`, so name order is
/// chronological order.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: Utf8PathBuf,
}

impl BackupManager {
    pub fn new<P: AsRef<Utf8Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Backups in the system temp directory.
    pub fn in_temp_dir() -> Result<Self> {
        let dir = Utf8PathBuf::try_from(std::env::temp_dir())
            .context("Temp directory path is not valid UTF-8")?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Copy `conf_path` into the backup directory, named after `now`.
    pub fn backup(&self, conf_path: &Utf8Path, now: NaiveDateTime) -> Result<Utf8PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("Failed to create backup directory: {}", self.dir))?;
        }

        let backup_path = self
            .dir
            .join(format!("{}{}", BACKUP_PREFIX, now.format(BACKUP_TIME_FORMAT)));
        fs::copy(conf_path, &backup_path)
            .with_context(|| format!("Failed to back up {} to {}", conf_path, backup_path))?;

        tracing::info!("Backed up {} to {}", conf_path, backup_path);
        Ok(backup_path)
    }

    /// Every backup, oldest first.
    pub fn list(&self) -> Result<Vec<Utf8PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = self
            .dir
            .read_dir_utf8()
            .with_context(|| format!("Failed to read backup directory: {}", self.dir))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read backup directory entry")?;
            if is_backup_name(entry.file_name()) {
                backups.push(entry.into_path());
            }
        }
        backups.sort();
        Ok(backups)
    }

    /// The most recent backup, if any.
    pub fn latest(&self) -> Result<Option<Utf8PathBuf>> {
        Ok(self.list()?.pop())
    }

    /// Overwrite `conf_path` with `backup_path`.
    pub fn restore(&self, backup_path: &Utf8Path, conf_path: &Utf8Path) -> Result<()> {
        fs::copy(backup_path, conf_path)
            .with_context(|| format!("Failed to restore {} from {}", conf_path, backup_path))?;
        tracing::info!("Restored {} from {}", conf_path, backup_path);
        Ok(())
    }
}

fn is_backup_name(name: &str) -> bool {
    name.strip_prefix(BACKUP_PREFIX)
        .is_some_and(|stamp| stamp.len() == 12 && stamp.chars().all(|c| c.is_ascii_digit()))
}
