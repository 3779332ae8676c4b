use std::fs;
use std::path::Path;

use toml::{Table, Value};

use super::schema::Settings;
use crate::error::{GameError, Result};

/// Write the session-mutable fields back into the override file.
///
/// Only `settings.songs_directory`, `settings.serial_port` and
/// `rules.playback_time_seconds` are touched; everything else already in the
/// file is kept as it was.
pub fn persist_overrides(path: &Path, settings: &Settings) -> Result<()> {
    let mut table: Table = if path.exists() {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| {
            GameError::ConfigMissing(format!("cannot update {}: {e}", path.display()))
        })?
    } else {
        Table::new()
    };

    let general = section_mut(&mut table, "settings", path)?;
    general.insert(
        "songs_directory".to_string(),
        Value::String(settings.general.songs_directory.clone()),
    );
    general.insert(
        "serial_port".to_string(),
        Value::String(settings.general.serial_port.clone()),
    );

    let rules = section_mut(&mut table, "rules", path)?;
    rules.insert(
        "playback_time_seconds".to_string(),
        Value::Integer(i64::try_from(settings.rules.playback_time_seconds).unwrap_or(i64::MAX)),
    );

    let text = toml::to_string_pretty(&table).map_err(|e| {
        GameError::ConfigMissing(format!("cannot serialize {}: {e}", path.display()))
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;

    log::info!("saved settings to {}", path.display());
    Ok(())
}

fn section_mut<'a>(table: &'a mut Table, name: &str, path: &Path) -> Result<&'a mut Table> {
    table
        .entry(name.to_string())
        .or_insert_with(|| Value::Table(Table::new()))
        .as_table_mut()
        .ok_or_else(|| {
            GameError::ConfigMissing(format!("[{name}] in {} is not a table", path.display()))
        })
}
