//! Game settings and preferences
//!
//! Persisted as JSON in the platform config directory, separate from the
//! account database.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consts::TICK_MS;
use crate::engine::{Direction, PaddleCommand, PlayerLabels};
use crate::sim::{BounceMode, MatchRules, Side};

/// Environment variable that overrides `database_path`
pub const DB_PATH_ENV: &str = "PONG_CLUB_DB";

const APP_DIR: &str = "pong-club";
const SETTINGS_FILE: &str = "settings.json";
const DB_FILE: &str = "pong_game.db";

/// Keys the match screen keeps for itself: start, pause, reset
const RESERVED_KEYS: [char; 3] = [' ', 'p', 'r'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyBindingError {
    #[error("key {0:?} is reserved for match controls")]
    Reserved(char),
    #[error("key {0:?} is bound twice")]
    Duplicate(char),
}

/// Paddle keys, one pair per player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub p1_up: char,
    pub p1_down: char,
    pub p2_up: char,
    pub p2_down: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            p1_up: 'w',
            p1_down: 's',
            p2_up: 'i',
            p2_down: 'k',
        }
    }
}

impl KeyBindings {
    /// Paddle command bound to `key` (case-insensitive)
    pub fn command_for(&self, key: char) -> Option<PaddleCommand> {
        let key = key.to_ascii_lowercase();
        let bound = |binding: char| binding.to_ascii_lowercase() == key;
        let (side, direction) = if bound(self.p1_up) {
            (Side::Left, Direction::Up)
        } else if bound(self.p1_down) {
            (Side::Left, Direction::Down)
        } else if bound(self.p2_up) {
            (Side::Right, Direction::Up)
        } else if bound(self.p2_down) {
            (Side::Right, Direction::Down)
        } else {
            return None;
        };
        Some(PaddleCommand { side, direction })
    }

    fn keys(&self) -> [char; 4] {
        [self.p1_up, self.p1_down, self.p2_up, self.p2_down]
    }

    /// Same bindings in lowercase
    pub fn normalized(self) -> Self {
        Self {
            p1_up: self.p1_up.to_ascii_lowercase(),
            p1_down: self.p1_down.to_ascii_lowercase(),
            p2_up: self.p2_up.to_ascii_lowercase(),
            p2_down: self.p2_down.to_ascii_lowercase(),
        }
    }

    /// Every paddle key must be distinct and leave the match controls free
    pub fn validate(&self) -> Result<(), KeyBindingError> {
        let keys = self.normalized().keys();
        for (i, key) in keys.iter().enumerate() {
            if RESERVED_KEYS.contains(key) {
                return Err(KeyBindingError::Reserved(*key));
            }
            if keys[..i].contains(key) {
                return Err(KeyBindingError::Duplicate(*key));
            }
        }
        Ok(())
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file holding accounts and match history
    pub database_path: PathBuf,
    pub player1_label: String,
    pub player2_label: String,
    pub keys: KeyBindings,
    pub bounce: BounceMode,
    /// Tick period in milliseconds
    pub tick_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let labels = PlayerLabels::default();
        Self {
            database_path: app_dir(dirs::data_dir()).join(DB_FILE),
            player1_label: labels.left,
            player2_label: labels.right,
            keys: KeyBindings::default(),
            bounce: BounceMode::Steady,
            tick_ms: TICK_MS,
        }
    }
}

impl Settings {
    pub fn labels(&self) -> PlayerLabels {
        PlayerLabels {
            left: self.player1_label.clone(),
            right: self.player2_label.clone(),
        }
    }

    pub fn rules(&self) -> MatchRules {
        MatchRules {
            bounce: self.bounce,
            ..MatchRules::default()
        }
    }

    /// Default settings file location
    pub fn default_path() -> PathBuf {
        app_dir(dirs::config_dir()).join(SETTINGS_FILE)
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Self {
        let mut settings = Self::load_from(&Self::default_path());
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.is_empty() {
                settings.database_path = PathBuf::from(path);
            }
        }
        settings
    }

    /// Load from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("Cannot read {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(mut settings) => {
                if settings.tick_ms == 0 {
                    log::warn!("tick_ms must be positive, using {}", TICK_MS);
                    settings.tick_ms = TICK_MS;
                }
                settings.keys = settings.keys.normalized();
                if let Err(e) = settings.keys.validate() {
                    log::warn!("Unusable key bindings: {}; using defaults", e);
                    settings.keys = KeyBindings::default();
                }
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Malformed settings in {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::default_path())
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.map(|dir| dir.join(APP_DIR)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tick_ms, 16);
        assert_eq!(settings.player1_label, "Player 1");
        assert!(settings.database_path.ends_with(DB_FILE));
        assert_eq!(settings.rules(), MatchRules::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(
            &path,
            r#"{"player2_label": "Robot", "bounce": {"mode": "jitter", "seed": 3}, "tick_ms": 0}"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.player2_label, "Robot");
        assert_eq!(settings.player1_label, "Player 1");
        assert_eq!(settings.bounce, BounceMode::Jitter { seed: 3 });
        assert_eq!(settings.tick_ms, TICK_MS);
        assert_eq!(settings.labels().right, "Robot");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join(SETTINGS_FILE);
        let mut settings = Settings::default();
        settings.database_path = PathBuf::from("/tmp/other.db");
        settings.keys.p2_up = 'o';
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_key_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(
            keys.command_for('W'),
            Some(PaddleCommand {
                side: Side::Left,
                direction: Direction::Up,
            })
        );
        assert_eq!(
            keys.command_for('k'),
            Some(PaddleCommand {
                side: Side::Right,
                direction: Direction::Down,
            })
        );
        assert_eq!(keys.command_for('x'), None);
    }

    #[test]
    fn test_uppercase_binding_matches() {
        let keys = KeyBindings {
            p1_up: 'W',
            ..KeyBindings::default()
        };
        let up = Some(PaddleCommand {
            side: Side::Left,
            direction: Direction::Up,
        });
        assert_eq!(keys.command_for('w'), up);
        assert_eq!(keys.command_for('W'), up);
    }

    #[test]
    fn test_validate_bindings() {
        assert_eq!(KeyBindings::default().validate(), Ok(()));
        let reserved = KeyBindings {
            p2_up: 'P',
            ..KeyBindings::default()
        };
        assert_eq!(reserved.validate(), Err(KeyBindingError::Reserved('p')));
        let twice = KeyBindings {
            p2_down: 'S',
            ..KeyBindings::default()
        };
        assert_eq!(twice.validate(), Err(KeyBindingError::Duplicate('s')));
    }

    #[test]
    fn test_load_lowercases_bindings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(
            &path,
            r#"{"keys": {"p1_up": "W", "p1_down": "S", "p2_up": "O", "p2_down": "L"}}"#,
        )
        .unwrap();
        let keys = Settings::load_from(&path).keys;
        assert_eq!((keys.p1_up, keys.p2_up, keys.p2_down), ('w', 'o', 'l'));
    }

    #[test]
    fn test_load_rejects_clashing_bindings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        for keys in [
            r#"{"p1_up": "r", "p1_down": "s", "p2_up": "i", "p2_down": "k"}"#,
            r#"{"p1_up": "w", "p1_down": "s", "p2_up": "w", "p2_down": "k"}"#,
        ] {
            std::fs::write(&path, format!(r#"{{"keys": {keys}, "player1_label": "Ann"}}"#))
                .unwrap();
            let settings = Settings::load_from(&path);
            assert_eq!(settings.keys, KeyBindings::default());
            assert_eq!(settings.player1_label, "Ann");
        }
    }
}
