//! pgconf-tune - Tune a PostgreSQL configuration file for TimescaleDB
//!
//! Main entry point for the command line tool.
//!
//! # Execution Flow
//!
//! 1. Parse flags, load settings (defaults → YAML file → `PGCONF_TUNE_*` env → flags)
//! 2. Initialize logging (stderr, plus rolling files with `--log-dir`)
//! 3. Locate `postgresql.conf` (explicit path, `PGDATA`, platform defaults)
//! 4. With `--restore`, copy the latest backup back and stop
//! 5. Parse the file, run the tuner, write the result
//!
//! The tuned file goes to `--out-path`, to stdout with `--dry-run`, or back
//! over the original after a backup is taken.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use pgconf_tune::cli::Cli;
use pgconf_tune::services::{
    AutoAccept, BackupManager, OsFileSystem, Platform, Prompter, TerminalPrompter, Tuner,
    find_conf_path, resolve_system, write_dry_run,
};
use pgconf_tune::{
    APP_NAME, ConfigFileState, ConfigManager, TuneReport, TuneSettings, VERSION, tune,
};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(cli.settings.as_deref().map(Utf8PathBuf::from));
    let mut settings = config_manager.load_settings()?;
    cli.apply_to(&mut settings);
    settings.validate()?;

    let log_dir = settings.log_dir.as_deref().map(Utf8Path::new);
    let _log_guard =
        pgconf_tune::logging::setup_logging(log_dir, APP_NAME, settings.debug, settings.quiet)?;

    tracing::debug!("{} v{} starting", APP_NAME, VERSION);

    if let Some(path) = &cli.write_settings {
        return config_manager.save_settings(Utf8Path::new(path), &settings);
    }

    let conf_path = find_conf_path(
        &OsFileSystem,
        settings.conf_path.as_deref().map(Utf8Path::new),
        Platform::current(),
        settings.pg_major()?,
        cli.pgdata.as_deref(),
    )?;
    tracing::info!("Using configuration file {}", conf_path);

    let backups = match &settings.backup_dir {
        Some(dir) => BackupManager::new(dir),
        None => BackupManager::in_temp_dir()?,
    };

    if cli.restore {
        return restore(&backups, &conf_path, &settings);
    }

    let system = resolve_system(&settings)?;
    let registry = tune::pattern_registry()?;
    let file = File::open(&conf_path).with_context(|| format!("Failed to open {}", conf_path))?;
    let mut state = ConfigFileState::from_reader(BufReader::new(file), &registry)
        .with_context(|| format!("Failed to parse {}", conf_path))?;
    let groups = tune::settings_groups(&system);

    let report = if settings.yes {
        run_tuner(AutoAccept, &settings, &mut state, &groups)?
    } else {
        run_tuner(TerminalPrompter, &settings, &mut state, &groups)?
    };

    if settings.dry_run {
        write_dry_run(
            &state,
            &report,
            settings.quiet,
            &mut io::stdout().lock(),
            &mut io::stderr(),
        )?;
        return Ok(());
    }

    if let Some(out_path) = &settings.out_path {
        let mut out = File::create(out_path)
            .with_context(|| format!("Failed to create {}", out_path))?;
        let written = state.write_to(&mut out)?;
        tracing::info!("Wrote {} bytes to {}", written, out_path);
    } else {
        backups.backup(&conf_path, chrono::Local::now().naive_local())?;
        let mut out = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&conf_path)
            .with_context(|| format!("Failed to open {} for writing", conf_path))?;
        let written = state.write_truncating(&mut out)?;
        tracing::info!("Wrote {} bytes to {}", written, conf_path);
    }

    if !settings.quiet {
        println!("{}", report.summary());
    }
    Ok(())
}

/// Messages go to stderr on a dry run so stdout carries only the file.
fn run_tuner<P: Prompter>(
    prompter: P,
    settings: &TuneSettings,
    state: &mut ConfigFileState,
    groups: &[tune::SettingsGroup],
) -> Result<TuneReport> {
    let out: Box<dyn Write> = if settings.dry_run {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    Tuner::new(prompter, out).quiet(settings.quiet).run(state, groups)
}

fn restore(backups: &BackupManager, conf_path: &Utf8Path, settings: &TuneSettings) -> Result<()> {
    let Some(latest) = backups.latest()? else {
        anyhow::bail!("No backups found in {}", backups.dir());
    };

    let question = format!("Restore {} from {}?", conf_path, latest);
    let confirmed = settings.yes || TerminalPrompter.confirm(&question)?;
    if !confirmed {
        tracing::warn!("Restore cancelled");
        return Ok(());
    }

    backups.restore(&latest, conf_path)?;
    if !settings.quiet {
        println!("Restored {} from {}", conf_path, latest);
    }
    Ok(())
}
