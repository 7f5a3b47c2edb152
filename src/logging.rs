use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Level filter for the given flags: `debug` wins over `quiet`.
pub fn level_filter(debug_mode: bool, quiet: bool) -> EnvFilter {
    if debug_mode {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::new("info")
    }
}

/// Setup logging to stderr, plus a daily rotating file when `log_dir` is set.
///
/// Stdout is left alone; it carries the tool's own output and, with
/// `--dry-run`, the tuned file.
///
/// # Arguments
/// * `log_dir` - Directory for log files, created if needed
/// * `log_prefix` - Prefix for log files (e.g., "pgconf-tune")
/// * `debug_mode` - If true, use debug level
/// * `quiet` - If true (and not debugging), only warnings and errors
///
/// # Returns
/// A guard that must be held for the duration of the program to keep file
/// logging active, when file logging is enabled
pub fn setup_logging(
    log_dir: Option<&Utf8Path>,
    log_prefix: &str,
    debug_mode: bool,
    quiet: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(log_dir) => {
            if !log_dir.exists() {
                fs::create_dir_all(log_dir)
                    .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
            }

            let file_appender = rolling::daily(log_dir, log_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false) // No ANSI codes in log files
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(level_filter(debug_mode, quiet))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    tracing::debug!(
        "Logging initialized: dir={:?}, prefix={}, debug={}, quiet={}",
        log_dir,
        log_prefix,
        debug_mode,
        quiet
    );

    Ok(guard)
}
