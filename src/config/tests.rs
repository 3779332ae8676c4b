use super::load::{default_config_path, resolve_config_path};
use super::*;
use crate::error::GameError;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

fn sources_with_override(path: PathBuf) -> SettingsSources {
    SettingsSources {
        defaults: None,
        overrides: Some(path),
    }
}

#[test]
fn resolve_config_path_prefers_buzzquiz_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("BUZZQUIZ_CONFIG_PATH", "/tmp/buzzquiz-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/buzzquiz-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/xdg-config-home")
            .join("buzzquiz")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("buzzquiz")
            .join("config.toml")
    );
}

#[test]
fn embedded_defaults_load_without_override_file() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();

    let s = Settings::load(&sources_with_override(dir.path().join("missing.toml"))).unwrap();
    assert_eq!(s.general.songs_directory, "songs");
    assert!(!s.general.use_streaming_backend);
    assert_eq!(s.rules.playback_time_seconds, 30);
    assert_eq!(s.rules.number_teams, 6);
    assert_eq!(s.team_name(0), "Team 1");
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "wav".to_string()]);
}

#[test]
fn override_file_replaces_only_matching_keys() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[settings]
songs_directory = "/srv/quiz/round1"

[rules]
points_correct = 10
points_incorrect = -5
number_teams = 4

[team_names]
name_2 = "The Rockers"
"#,
    )
    .unwrap();

    let s = Settings::load(&sources_with_override(cfg_path)).unwrap();
    assert_eq!(s.general.songs_directory, "/srv/quiz/round1");
    assert_eq!(s.rules.points_correct, 10);
    assert_eq!(s.rules.points_incorrect, -5);
    assert_eq!(s.rules.number_teams, 4);
    // Untouched keys keep the base values.
    assert_eq!(s.rules.playback_time_seconds, 30);
    assert_eq!(s.team_name(0), "Team 1");
    assert_eq!(s.team_name(1), "The Rockers");
}

#[test]
fn env_overrides_config_file() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[rules]\nplayback_time_seconds = 45\n").unwrap();

    let _g = EnvGuard::set("BUZZQUIZ__RULES__PLAYBACK_TIME_SECONDS", "12");

    let s = Settings::load(&sources_with_override(cfg_path)).unwrap();
    assert_eq!(s.rules.playback_time_seconds, 12);
}

#[test]
fn boolean_strings_are_parsed_strictly() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");

    std::fs::write(&cfg_path, "[settings]\nuse_streaming_backend = \"false\"\n").unwrap();
    let s = Settings::load(&sources_with_override(cfg_path.clone())).unwrap();
    assert!(!s.general.use_streaming_backend);

    std::fs::write(&cfg_path, "[settings]\nuse_streaming_backend = \"no thanks\"\n").unwrap();
    let err = Settings::load(&sources_with_override(cfg_path)).unwrap_err();
    assert!(matches!(err, GameError::ConfigMissing(_)), "{err}");
}

#[test]
fn missing_required_key_is_a_config_error() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("default.toml");
    std::fs::write(
        &base,
        r#"
[settings]
songs_directory = "songs"
use_streaming_backend = false

[rules]
playback_time_seconds = 30
points_incorrect = 0
number_teams = 6
"#,
    )
    .unwrap();

    let sources = SettingsSources {
        defaults: Some(base),
        overrides: Some(dir.path().join("absent.toml")),
    };
    let err = Settings::load(&sources).unwrap_err();
    match err {
        GameError::ConfigMissing(msg) => assert!(msg.contains("points_correct"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_defaults_file_is_a_config_error() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let sources = SettingsSources {
        defaults: Some(dir.path().join("nope.toml")),
        overrides: None,
    };
    assert!(matches!(
        Settings::load(&sources),
        Err(GameError::ConfigMissing(_))
    ));
}

#[test]
fn validate_rejects_out_of_range_rules() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");

    std::fs::write(&cfg_path, "[rules]\nnumber_teams = 7\n").unwrap();
    assert!(Settings::load(&sources_with_override(cfg_path.clone())).is_err());

    std::fs::write(&cfg_path, "[rules]\nplayback_time_seconds = 0\n").unwrap();
    assert!(Settings::load(&sources_with_override(cfg_path.clone())).is_err());

    std::fs::write(&cfg_path, "[settings]\nuse_streaming_backend = true\n").unwrap();
    let err = Settings::load(&sources_with_override(cfg_path)).unwrap_err();
    assert!(err.to_string().contains("streaming_client_id"), "{err}");
}

#[test]
fn persist_overrides_updates_mutable_fields_and_keeps_the_rest() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("nested").join("config.toml");
    std::fs::create_dir_all(cfg_path.parent().unwrap()).unwrap();
    std::fs::write(
        &cfg_path,
        r#"
[rules]
points_correct = 3

[team_names]
name_1 = "Quizzers"
"#,
    )
    .unwrap();

    let mut s = Settings::load(&sources_with_override(cfg_path.clone())).unwrap();
    s.general.songs_directory = "/music/round2".to_string();
    s.general.serial_port = "/dev/ttyUSB0".to_string();
    s.rules.playback_time_seconds = 20;

    persist_overrides(&cfg_path, &s).unwrap();

    let reloaded = Settings::load(&sources_with_override(cfg_path)).unwrap();
    assert_eq!(reloaded.general.songs_directory, "/music/round2");
    assert_eq!(reloaded.general.serial_port, "/dev/ttyUSB0");
    assert_eq!(reloaded.rules.playback_time_seconds, 20);
    assert_eq!(reloaded.rules.points_correct, 3);
    assert_eq!(reloaded.team_name(0), "Quizzers");
}

#[test]
fn persist_overrides_creates_missing_file() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("fresh").join("config.toml");

    let s = Settings::load(&sources_with_override(cfg_path.clone())).unwrap();
    persist_overrides(&cfg_path, &s).unwrap();

    let text = std::fs::read_to_string(&cfg_path).unwrap();
    assert!(text.contains("songs_directory"));
    assert!(text.contains("playback_time_seconds = 30"));
}
