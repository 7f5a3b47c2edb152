use crate::models::TuneSettings;
use clap::Parser;

/// Command line flags. Anything given here overrides the settings file and
/// environment.
#[derive(Parser, Debug, Default)]
#[command(name = "pgconf-tune", version)]
#[command(about = "Tune postgresql.conf for TimescaleDB", long_about = None)]
pub struct Cli {
    /// YAML settings file
    #[arg(long)]
    pub settings: Option<String>,

    /// Path to postgresql.conf (discovered when omitted)
    #[arg(long)]
    pub conf_path: Option<String>,

    /// Data directory searched for postgresql.conf
    #[arg(long, env = "PGDATA")]
    pub pgdata: Option<String>,

    /// Write the tuned file here instead of overwriting the original
    #[arg(long)]
    pub out_path: Option<String>,

    /// Postgres version to tune for
    #[arg(long)]
    pub pg_version: Option<String>,

    /// Memory to tune for, e.g. 8GB (detected when omitted)
    #[arg(long)]
    pub memory: Option<String>,

    /// Number of CPUs to tune for (detected when omitted)
    #[arg(long)]
    pub cpus: Option<usize>,

    /// Maximum number of client connections
    #[arg(long = "max-conns")]
    pub max_connections: Option<u64>,

    /// Maximum number of TimescaleDB background workers
    #[arg(long)]
    pub max_bg_workers: Option<u64>,

    /// Size of the disk holding the WAL, e.g. 100GB
    #[arg(long)]
    pub wal_disk_size: Option<String>,

    /// Directory for backups of the original file
    #[arg(long)]
    pub backup_dir: Option<String>,

    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Accept every recommendation without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Only print the resulting settings
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the tuned file to stdout instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Turn debugging information on
    #[arg(short, long)]
    pub debug: bool,

    /// Restore the most recent backup and exit
    #[arg(long)]
    pub restore: bool,

    /// Write the effective settings to this YAML file and exit
    #[arg(long)]
    pub write_settings: Option<String>,
}

impl Cli {
    /// Apply every flag that was given on top of `settings`.
    pub fn apply_to(&self, settings: &mut TuneSettings) {
        let overrides = [
            (&self.conf_path, &mut settings.conf_path),
            (&self.out_path, &mut settings.out_path),
            (&self.memory, &mut settings.memory),
            (&self.wal_disk_size, &mut settings.wal_disk_size),
            (&self.backup_dir, &mut settings.backup_dir),
            (&self.log_dir, &mut settings.log_dir),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = Some(value.clone());
            }
        }

        if let Some(pg_version) = &self.pg_version {
            settings.pg_version = pg_version.clone();
        }
        if let Some(cpus) = self.cpus {
            settings.cpus = Some(cpus);
        }
        if let Some(max_connections) = self.max_connections {
            settings.max_connections = max_connections;
        }
        if let Some(max_bg_workers) = self.max_bg_workers {
            settings.max_bg_workers = max_bg_workers;
        }

        settings.yes |= self.yes;
        settings.quiet |= self.quiet;
        settings.dry_run |= self.dry_run;
        settings.debug |= self.debug;
    }
}
