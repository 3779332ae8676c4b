use std::path::PathBuf;

use anyhow::Context;

use crate::config::{self, Settings, SettingsSources};
use crate::controller::Controller;

/// Load the layered settings. Missing or malformed settings are fatal.
pub fn load_settings(
    defaults: Option<PathBuf>,
    overrides: Option<PathBuf>,
    songs: Option<PathBuf>,
) -> anyhow::Result<(Settings, SettingsSources)> {
    let sources = SettingsSources::resolve(defaults, overrides);
    let mut settings = Settings::load(&sources).context("failed to load settings")?;

    if let Some(dir) = songs {
        settings.general.songs_directory = dir.display().to_string();
    }
    log::debug!(
        "settings loaded: {} teams, {}s clips, songs from {}",
        settings.rules.number_teams,
        settings.rules.playback_time_seconds,
        settings.general.songs_directory
    );
    Ok((settings, sources))
}

/// Copy what the operator changed during the session into `settings` and
/// write it to the override file. Failures are logged; the session is over.
pub fn write_back(settings: &mut Settings, sources: &SettingsSources, controller: &Controller) {
    settings.general.songs_directory = controller.songs_directory().display().to_string();
    settings.rules.playback_time_seconds = controller.playback_time_secs();

    let Some(path) = sources.overrides.as_deref() else {
        log::warn!("no override settings path; session settings not saved");
        return;
    };

    match config::persist_overrides(path, settings) {
        Ok(()) => log::info!("saved session settings to {}", path.display()),
        Err(e) => {
            log::error!("could not save settings to {}: {e}", path.display());
            eprintln!("buzzquiz: could not save settings to {}: {e}", path.display());
        }
    }
}
