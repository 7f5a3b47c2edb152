//! Locating `postgresql.conf` on the local machine.
//!
//! Lookup order:
//! 1. an explicit path from settings (must exist)
//! 2. `$PGDATA/postgresql.conf`
//! 3. well-known package locations for the platform and Postgres major version
//!
//! Filesystem access goes through [`FileSystem`] so lookups can be tested
//! without touching the real disk.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

pub const CONF_FILE_NAME: &str = "postgresql.conf";

/// Filesystem queries discovery needs.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    fn is_file(&self, path: &Utf8Path) -> bool;
}

/// [`FileSystem`] backed by the real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Utf8Path) -> bool {
        path.is_file()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Configuration file not found: {0}")]
    ExplicitPathMissing(Utf8PathBuf),

    #[error(
        "Could not find postgresql.conf, pass --conf-path (searched: {})",
        .searched.join(", ")
    )]
    NotFound { searched: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }
}

/// Candidate locations in search order, `$PGDATA` first.
pub fn candidate_paths(
    platform: Platform,
    pg_major: u32,
    pgdata: Option<&str>,
) -> Vec<Utf8PathBuf> {
    let mut candidates = Vec::new();

    if let Some(pgdata) = pgdata.filter(|p| !p.trim().is_empty()) {
        candidates.push(Utf8Path::new(pgdata).join(CONF_FILE_NAME));
    }

    let templates: &[&str] = match platform {
        Platform::Linux => &[
            "/etc/postgresql/{v}/main",
            "/var/lib/pgsql/{v}/data",
            "/var/lib/pgsql/data",
            "/var/lib/postgresql/data",
            "/var/lib/postgres/data",
        ],
        Platform::MacOs => &[
            "/opt/homebrew/var/postgresql@{v}",
            "/usr/local/var/postgresql@{v}",
            "/opt/homebrew/var/postgres",
            "/usr/local/var/postgres",
            "/Library/PostgreSQL/{v}/data",
        ],
        Platform::Other => &[],
    };

    let version = pg_major.to_string();
    candidates.extend(
        templates
            .iter()
            .map(|t| Utf8PathBuf::from(t.replace("{v}", &version)).join(CONF_FILE_NAME)),
    );
    candidates
}

/// Resolve the configuration file to tune.
pub fn find_conf_path(
    fs: &dyn FileSystem,
    explicit: Option<&Utf8Path>,
    platform: Platform,
    pg_major: u32,
    pgdata: Option<&str>,
) -> Result<Utf8PathBuf, DiscoveryError> {
    if let Some(path) = explicit {
        if fs.is_file(path) {
            return Ok(path.to_path_buf());
        }
        return Err(DiscoveryError::ExplicitPathMissing(path.to_path_buf()));
    }

    let candidates = candidate_paths(platform, pg_major, pgdata);
    for candidate in &candidates {
        if fs.is_file(candidate) {
            tracing::debug!("Found configuration file at {}", candidate);
            return Ok(candidate.clone());
        }
        tracing::debug!("No configuration file at {}", candidate);
    }

    Err(DiscoveryError::NotFound {
        searched: candidates.iter().map(|c| c.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let mut fs = MockFileSystem::new();
        fs.expect_is_file().times(1).returning(|_| true);

        let path = find_conf_path(
            &fs,
            Some(Utf8Path::new("/srv/pg/postgresql.conf")),
            Platform::Linux,
            16,
            Some("/data"),
        )
        .unwrap();

        assert_eq!(path, Utf8PathBuf::from("/srv/pg/postgresql.conf"));
    }

    #[test]
    fn test_missing_explicit_path_does_not_search() {
        let mut fs = MockFileSystem::new();
        fs.expect_is_file().times(1).returning(|_| false);

        let err = find_conf_path(&fs, Some(Utf8Path::new("/nope.conf")), Platform::Linux, 16, None)
            .unwrap_err();

        assert_eq!(err, DiscoveryError::ExplicitPathMissing("/nope.conf".into()));
    }

    #[test]
    fn test_pgdata_searched_first() {
        let mut fs = MockFileSystem::new();
        fs.expect_is_file()
            .returning(|p| p.as_str() == "/data/pg/postgresql.conf");

        let path = find_conf_path(&fs, None, Platform::Linux, 16, Some("/data/pg")).unwrap();
        assert_eq!(path, Utf8PathBuf::from("/data/pg/postgresql.conf"));
    }

    #[test]
    fn test_versioned_debian_path() {
        let mut fs = MockFileSystem::new();
        fs.expect_is_file()
            .returning(|p| p.as_str() == "/etc/postgresql/15/main/postgresql.conf");

        let path = find_conf_path(&fs, None, Platform::Linux, 15, None).unwrap();
        assert_eq!(path, Utf8PathBuf::from("/etc/postgresql/15/main/postgresql.conf"));
    }

    #[test]
    fn test_not_found_lists_candidates() {
        let mut fs = MockFileSystem::new();
        fs.expect_is_file().returning(|_| false);

        let err = find_conf_path(&fs, None, Platform::MacOs, 16, None).unwrap_err();
        let DiscoveryError::NotFound { searched } = err else {
            panic!("expected NotFound");
        };
        assert_eq!(searched.len(), 5);
        assert_eq!(searched[0], "/opt/homebrew/var/postgresql@16/postgresql.conf");
    }

    #[test]
    fn test_blank_pgdata_ignored() {
        let candidates = candidate_paths(Platform::Other, 16, Some("  "));
        assert!(candidates.is_empty());
    }
}
