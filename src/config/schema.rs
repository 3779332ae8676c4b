use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;

use crate::error::{GameError, Result};

/// Highest number of teams the board supports.
pub const MAX_TEAMS: usize = 6;

/// Top-level settings merged from the base and override files.
///
/// File format: TOML, sections `[settings]`, `[rules]`, `[team_names]` and
/// `[library]`. Every key of `[settings]` and `[rules]` without a default must
/// be present in at least one layer, otherwise loading fails.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(rename = "settings")]
    pub general: GeneralSettings,
    pub rules: Rules,
    /// `name_1` .. `name_6`.
    #[serde(default)]
    pub team_names: BTreeMap<String, String>,
    #[serde(default)]
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralSettings {
    /// Directory scanned for song files.
    pub songs_directory: String,
    /// Port of the buzzer box. Only stored and written back.
    #[serde(default)]
    pub serial_port: String,
    /// Play from the streaming service instead of `songs_directory`.
    #[serde(deserialize_with = "strict_bool")]
    pub use_streaming_backend: bool,
    #[serde(default)]
    pub streaming_client_id: String,
    #[serde(default)]
    pub streaming_client_secret: String,
    #[serde(default)]
    pub streaming_redirect_uri: String,
    /// JSON file holding the cached access and refresh tokens.
    #[serde(default = "default_token_cache")]
    pub streaming_token_cache: PathBuf,
}

fn default_token_cache() -> PathBuf {
    PathBuf::from("cache").join("streaming_token.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rules {
    /// Length of each clip in seconds.
    pub playback_time_seconds: u64,
    pub points_correct: i64,
    /// Usually zero or negative.
    pub points_incorrect: i64,
    pub number_teams: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as songs (case-insensitive, without dot).
    pub extensions: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "wav".into()],
        }
    }
}

impl Settings {
    /// Check ranges and cross-field requirements that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.rules.number_teams == 0 || self.rules.number_teams > MAX_TEAMS {
            return Err(GameError::ConfigMissing(format!(
                "rules.number_teams must be between 1 and {MAX_TEAMS}, got {}",
                self.rules.number_teams
            )));
        }
        if self.rules.playback_time_seconds == 0 {
            return Err(GameError::ConfigMissing(
                "rules.playback_time_seconds must be >= 1".to_string(),
            ));
        }
        if self.general.use_streaming_backend {
            for (key, value) in [
                ("streaming_client_id", &self.general.streaming_client_id),
                ("streaming_client_secret", &self.general.streaming_client_secret),
            ] {
                if value.trim().is_empty() {
                    return Err(GameError::ConfigMissing(format!(
                        "settings.{key} is required when use_streaming_backend = true"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Display name of team `index` (zero-based). Falls back to `Team N`.
    pub fn team_name(&self, index: usize) -> String {
        self.team_names
            .get(&format!("name_{}", index + 1))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Team {}", index + 1))
    }
}

/// Accept only real booleans or the exact strings `"true"` / `"false"`.
fn strict_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct StrictBool;

    impl Visitor<'_> for StrictBool {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean or the string \"true\" or \"false\"")
        }

        fn visit_bool<E>(self, v: bool) -> std::result::Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<bool, E>
        where
            E: de::Error,
        {
            match v.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(StrictBool)
}
