use super::prompt::Prompter;
use crate::pgconf::{
    ConfigFileState, DuplicateRemover, EXTENSION_NAME, SHARED_LIB_KEY, SharedLibResult,
    compute_visible_keys,
};
use crate::tune::{LAST_TUNED_KEY, LAST_TUNED_VERSION_KEY, SettingsGroup};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::io::Write;

/// What a tuning run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TuneReport {
    pub shared_lib_updated: bool,
    pub groups_applied: Vec<String>,
    pub groups_declined: Vec<String>,
    pub settings_changed: usize,
    pub duplicates_removed: usize,
}

impl TuneReport {
    pub fn summary(&self) -> String {
        if !self.shared_lib_updated && self.settings_changed == 0 {
            return "Nothing to change".to_string();
        }

        let mut parts = Vec::new();
        if self.shared_lib_updated {
            parts.push(format!("{} updated", SHARED_LIB_KEY));
        }
        if self.settings_changed > 0 {
            parts.push(format!(
                "{} settings changed ({})",
                self.settings_changed,
                self.groups_applied.join(", ")
            ));
        }
        parts.join(", ")
    }
}

enum GroupOutcome {
    AlreadyTuned,
    Applied(usize),
    Declined,
}

/// Walks an operator through the recommended changes to a configuration file.
///
/// Messages go to `out`; with `quiet` only the resulting setting lines are
/// printed. Every change is confirmed through the [`Prompter`] first.
pub struct Tuner<P, W> {
    prompter: P,
    out: W,
    quiet: bool,
    tuned_at: String,
    version: String,
}

impl<P: Prompter, W: Write> Tuner<P, W> {
    pub fn new(prompter: P, out: W) -> Self {
        Self {
            prompter,
            out,
            quiet: false,
            tuned_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            version: crate::VERSION.to_string(),
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Override the timestamp recorded in `timescaledb.last_tuned`.
    pub fn tuned_at(mut self, tuned_at: impl Into<String>) -> Self {
        self.tuned_at = tuned_at.into();
        self
    }

    /// Run every step against `state`: the shared library line, each settings
    /// group in order, then the bookkeeping settings.
    pub fn run(
        &mut self,
        state: &mut ConfigFileState,
        groups: &[SettingsGroup],
    ) -> Result<TuneReport> {
        let mut report = TuneReport {
            shared_lib_updated: self.process_shared_lib(state)?,
            ..TuneReport::default()
        };

        for group in groups {
            if !group.recommender.is_available() {
                tracing::info!("Skipping {} settings: not applicable to this system", group.label);
                continue;
            }

            match self.process_group(state, group)? {
                GroupOutcome::AlreadyTuned => {}
                GroupOutcome::Applied(changed) => {
                    report.settings_changed += changed;
                    report.groups_applied.push(group.label.to_string());
                }
                GroupOutcome::Declined => report.groups_declined.push(group.label.to_string()),
            }
        }

        report.duplicates_removed = self.update_bookkeeping(state)?;
        tracing::info!("Tuning finished: {}", report.summary());
        Ok(report)
    }

    fn process_shared_lib(&mut self, state: &mut ConfigFileState) -> Result<bool> {
        let (current, updated) = match &state.shared_lib {
            Some(shared) if !shared.commented && shared.has_timescale => {
                self.note(format!(
                    "success: {} already includes {}",
                    SHARED_LIB_KEY, EXTENSION_NAME
                ))?;
                return Ok(false);
            }
            Some(shared) => {
                let current = state
                    .lines
                    .get(shared.index)
                    .map(|line| line.content.clone());
                (current, with_extension(shared))
            }
            None => (
                None,
                SharedLibResult {
                    index: state.lines.len(),
                    commented: false,
                    has_timescale: true,
                    comment_group: String::new(),
                    libs: EXTENSION_NAME.to_string(),
                    extra: String::new(),
                },
            ),
        };
        let content = render_shared_lib(&updated);

        self.note(format!("{} needs to be updated", SHARED_LIB_KEY))?;
        self.note("Current:")?;
        self.note(
            current
                .clone()
                .unwrap_or_else(|| format!("{} is missing", SHARED_LIB_KEY)),
        )?;
        self.note("Recommended:")?;
        self.emit(&content)?;

        if !self.prompter.confirm("Is this okay?")? {
            tracing::warn!("{} left without {}", SHARED_LIB_KEY, EXTENSION_NAME);
            self.note(format!("{} was not changed", SHARED_LIB_KEY))?;
            return Ok(false);
        }

        let index = if current.is_some() {
            state.replace_line(updated.index, content)?;
            updated.index
        } else {
            state.append_line(content)
        };
        state.shared_lib = Some(SharedLibResult { index, ..updated });

        self.note(format!("success: {} will be updated", SHARED_LIB_KEY))?;
        Ok(true)
    }

    fn process_group(
        &mut self,
        state: &mut ConfigFileState,
        group: &SettingsGroup,
    ) -> Result<GroupOutcome> {
        let visible = compute_visible_keys(
            group.keys,
            &state.tunables,
            group.recommender.as_ref(),
            group.parser,
        )
        .with_context(|| format!("Failed to compare {} settings", group.label))?;

        if visible.is_empty() {
            self.note(format!("success: {} settings are already tuned", group.label))?;
            return Ok(GroupOutcome::AlreadyTuned);
        }

        let mut changes = Vec::with_capacity(visible.len());
        for key in &visible {
            let value = group
                .recommender
                .recommend(key)
                .with_context(|| format!("No recommendation for {}", key))?;
            changes.push((key.as_str(), value));
        }

        self.note(format!("Recommendations for {} settings", group.label))?;
        self.note("Current:")?;
        for key in &visible {
            self.note(current_line(state, key))?;
        }
        self.note("Recommended:")?;
        for (key, value) in &changes {
            self.emit(format!("{} = {}", key, value))?;
        }

        if !self.prompter.confirm("Is this okay?")? {
            self.note(format!("{} settings were not changed", group.label))?;
            return Ok(GroupOutcome::Declined);
        }

        for (key, value) in &changes {
            state.set_setting(key, value)?;
            tracing::debug!("Set {} = {}", key, value);
        }
        self.note(format!("success: {} settings will be updated", group.label))?;
        Ok(GroupOutcome::Applied(changes.len()))
    }

    /// Collapse repeated bookkeeping lines left by earlier runs and record this
    /// run. Returns how many lines were flagged for removal.
    fn update_bookkeeping(&mut self, state: &mut ConfigFileState) -> Result<usize> {
        let removed_before = state.lines.iter().filter(|l| l.remove).count();

        let mut last_tuned = DuplicateRemover::new(LAST_TUNED_KEY)?;
        let mut last_version = DuplicateRemover::new(LAST_TUNED_VERSION_KEY)?;
        state.process_lines(&mut [&mut last_tuned, &mut last_version])?;

        let removed = state.lines.iter().filter(|l| l.remove).count() - removed_before;
        if removed > 0 {
            tracing::info!("Removed {} duplicate bookkeeping lines", removed);
        }

        state.set_setting(LAST_TUNED_KEY, &quoted(&self.tuned_at))?;
        state.set_setting(LAST_TUNED_VERSION_KEY, &quoted(&self.version))?;
        Ok(removed)
    }

    fn note(&mut self, message: impl AsRef<str>) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.emit(message)
    }

    fn emit(&mut self, message: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", message.as_ref()).context("Failed to write output")
    }
}

/// Dry run output: the tuned file on `out` and nothing else, so it can be
/// redirected straight into a new `postgresql.conf`. The summary goes to
/// `messages` unless `quiet`. Returns the bytes written to `out`.
pub fn write_dry_run<O: Write, M: Write>(
    state: &ConfigFileState,
    report: &TuneReport,
    quiet: bool,
    out: &mut O,
    messages: &mut M,
) -> Result<u64> {
    let written = state
        .write_to(out)
        .context("Failed to write tuned configuration")?;
    if !quiet {
        writeln!(messages, "{}", report.summary()).context("Failed to write summary")?;
    }
    Ok(written)
}

/// The shared library line after uncommenting it and making sure the extension
/// is listed first.
fn with_extension(shared: &SharedLibResult) -> SharedLibResult {
    let libs = if shared.libs.trim().is_empty() {
        EXTENSION_NAME.to_string()
    } else if shared.has_timescale {
        shared.libs.clone()
    } else {
        format!("{},{}", EXTENSION_NAME, shared.libs)
    };

    SharedLibResult {
        index: shared.index,
        commented: false,
        has_timescale: true,
        comment_group: String::new(),
        libs,
        extra: shared.extra.clone(),
    }
}

fn render_shared_lib(shared: &SharedLibResult) -> String {
    format!("{} = '{}'{}", SHARED_LIB_KEY, shared.libs, shared.extra)
}

fn current_line(state: &ConfigFileState, key: &str) -> String {
    state
        .tunables
        .get(key)
        .filter(|r| !r.missing)
        .and_then(|r| r.index)
        .and_then(|index| state.lines.get(index))
        .map(|line| line.content.clone())
        .unwrap_or_else(|| format!("{} is missing", key))
}

fn quoted(value: &str) -> String {
    format!("'{}'", value)
}
