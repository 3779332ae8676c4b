use std::{env, path::PathBuf};

use ::config::{Environment, File, FileFormat};

use super::schema::Settings;
use crate::error::Result;

/// Base settings compiled into the binary, used when no `--defaults` file is given.
pub const DEFAULT_SETTINGS: &str = include_str!("../../data/default.toml");

/// Where the two settings layers come from.
#[derive(Debug, Clone, Default)]
pub struct SettingsSources {
    /// Base file. `None` means the embedded defaults.
    pub defaults: Option<PathBuf>,
    /// Override file; optional on disk, and the write-back target.
    pub overrides: Option<PathBuf>,
}

impl SettingsSources {
    /// Explicit paths win; otherwise the override path comes from
    /// `BUZZQUIZ_CONFIG_PATH` or the XDG default.
    pub fn resolve(defaults: Option<PathBuf>, overrides: Option<PathBuf>) -> Self {
        Self {
            defaults,
            overrides: overrides.or_else(resolve_config_path),
        }
    }
}

impl Settings {
    /// Merge base file, override file and `BUZZQUIZ__` environment variables
    /// key by key, then validate.
    pub fn load(sources: &SettingsSources) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        builder = match &sources.defaults {
            Some(path) => builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            ),
            None => builder.add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml)),
        };

        if let Some(path) = &sources.overrides {
            if path.exists() {
                log::info!("loading override settings from {}", path.display());
            }
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("BUZZQUIZ")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The embedded base settings alone, without override file or environment.
    #[cfg(test)]
    pub fn embedded_defaults() -> Result<Self> {
        let settings: Settings = ::config::Config::builder()
            .add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Resolve the override path from `BUZZQUIZ_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("BUZZQUIZ_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/buzzquiz/config.toml`, or `~/.config/buzzquiz/config.toml`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("buzzquiz").join("config.toml"))
}

/// `$XDG_STATE_HOME/buzzquiz/buzzquiz.log`, or `~/.local/state/buzzquiz/buzzquiz.log`.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("buzzquiz").join("buzzquiz.log"))
}
