use crate::models::TuneSettings;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// Prefix of environment variables that override settings, e.g.
/// `PGCONF_TUNE_MAX_CONNECTIONS=200`.
pub const ENV_PREFIX: &str = "PGCONF_TUNE";

/// Loads [`TuneSettings`] from layered sources.
///
/// Precedence, lowest first:
/// - built-in defaults
/// - the YAML settings file, when one is given
/// - `PGCONF_TUNE_*` environment variables
///
/// Command line flags are applied on top by the caller.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings_path: Option<Utf8PathBuf>,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a ConfigManager reading the optional settings file at `settings_path`.
    pub fn new(settings_path: Option<Utf8PathBuf>) -> Self {
        Self {
            settings_path,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Read environment overrides from `<prefix>_*` instead of the default prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load and merge all sources.
    ///
    /// A settings path that was given but does not exist is an error, not a
    /// silent fallback to defaults.
    pub fn load_settings(&self) -> Result<TuneSettings> {
        let defaults = serde_yaml_ng::to_string(&TuneSettings::default())
            .context("Failed to serialize default settings")?;

        let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Yaml));

        if let Some(path) = &self.settings_path {
            if !path.exists() {
                bail!("Settings file not found: {}", path);
            }
            builder = builder.add_source(File::new(path.as_str(), FileFormat::Yaml));
            tracing::debug!("Reading settings from {}", path);
        }

        builder = builder.add_source(Environment::with_prefix(&self.env_prefix).try_parsing(true));

        let settings: TuneSettings = builder
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Failed to deserialize settings")?;

        Ok(settings)
    }

    /// Write `settings` as YAML to `path`.
    pub fn save_settings(&self, path: &Utf8Path, settings: &TuneSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory: {}", parent))?;
            }
        }

        fs::write(path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", path))?;

        tracing::info!("Saved settings to {}", path);
        Ok(())
    }

    /// Path of the settings file, if one was given.
    pub fn settings_path(&self) -> Option<&Utf8Path> {
        self.settings_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_defaults_without_file() {
        let manager = ConfigManager::new(None).with_env_prefix("PGCONF_TUNE_UNIT_DEFAULTS");
        let settings = manager.load_settings().unwrap();
        assert_eq!(settings, TuneSettings::default());
    }

    #[test]
    fn test_missing_settings_file_is_error() {
        let (_temp_dir, root) = temp_root();
        let manager = ConfigManager::new(Some(root.join("absent.yaml")));
        assert!(manager.load_settings().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let (_temp_dir, root) = temp_root();
        let path = root.join("nested").join("settings.yaml");
        let manager =
            ConfigManager::new(Some(path.clone())).with_env_prefix("PGCONF_TUNE_UNIT_SAVE");

        let settings = TuneSettings {
            memory: Some("32GB".to_string()),
            cpus: Some(12),
            dry_run: true,
            ..TuneSettings::default()
        };
        manager.save_settings(&path, &settings).unwrap();

        assert_eq!(manager.load_settings().unwrap(), settings);
    }
}
