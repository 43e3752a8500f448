use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GameError, Result};
use crate::geometry::Vec2;
use crate::motion::MotionTable;

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "ALIEN_INVADER_CONFIG";
/// Config file picked up from the working directory when the env var is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/alien_invader.toml";

/// Data-driven configuration for one game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for every RNG in the session. `None` draws one from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub playfield: PlayfieldConfig,
    pub player: PlayerConfig,
    pub laser: LaserConfig,
    pub aliens: AlienConfig,
    pub mover: MoverConfig,
    pub spawner: SpawnerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            playfield: PlayfieldConfig::default(),
            player: PlayerConfig::default(),
            laser: LaserConfig::default(),
            aliens: AlienConfig::default(),
            mover: MoverConfig::default(),
            spawner: SpawnerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_x: i32,
    pub start_y: i32,
    /// Side length of the square avatar.
    pub size: i32,
    /// Pixels moved per tick along each held axis.
    pub speed: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_x: 390,
            start_y: 550,
            size: 20,
            speed: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    /// Pixels travelled per tick.
    pub speed: i32,
    /// Minimum time between two shots. Zero fires every tick the key is held.
    pub cooldown_ms: u64,
    /// Drop lasers once they have left the playfield entirely.
    pub cull_offscreen: bool,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            speed: 5,
            cooldown_ms: 200,
            cull_offscreen: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlienConfig {
    pub size: i32,
    /// Aliens seeded when the session starts.
    pub initial: usize,
    /// Spawn a fresh random alien for every one shot down.
    pub respawn_on_kill: bool,
    /// Draw every alien red regardless of kind.
    pub monochrome: bool,
    pub motion: MotionTable,
}

impl Default for AlienConfig {
    fn default() -> Self {
        Self {
            size: 20,
            initial: 1,
            respawn_on_kill: false,
            monochrome: false,
            motion: MotionTable::default(),
        }
    }
}

/// Background task that moves every alien on a fixed cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 50,
        }
    }
}

/// Background task that drops in a batch of new aliens on a fixed cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    pub count: usize,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5000,
            count: 5,
        }
    }
}

impl GameConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::from_path(&path) {
                Ok(config) => return config,
                Err(e) => warn!(error = %e, %path, "ignoring config from {CONFIG_ENV}"),
            }
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            match Self::from_path(DEFAULT_CONFIG_PATH) {
                Ok(config) => return config,
                Err(e) => warn!(error = %e, "ignoring {DEFAULT_CONFIG_PATH}"),
            }
        }
        debug!("using default config");
        Self::default()
    }

    /// Read, parse and validate a TOML config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        let bounds = self.bounds();
        if bounds.x <= 0 || bounds.y <= 0 {
            return Err(invalid(format!(
                "playfield must be positive, got {}x{}",
                bounds.x, bounds.y
            )));
        }
        for (what, size) in [("player", self.player.size), ("alien", self.aliens.size)] {
            if size <= 0 {
                return Err(invalid(format!("{what} size must be positive, got {size}")));
            }
            if size > bounds.x || size > bounds.y {
                return Err(invalid(format!(
                    "{what} size {size} does not fit a {}x{} playfield",
                    bounds.x, bounds.y
                )));
            }
        }
        if self.player.speed <= 0 {
            return Err(invalid("player speed must be positive".into()));
        }
        if self.laser.speed <= 0 {
            return Err(invalid("laser speed must be positive".into()));
        }
        if self.aliens.motion.policies().iter().any(|p| p.reach() < 0) {
            return Err(invalid("alien motion steps must not be negative".into()));
        }
        if self.mover.enabled && self.mover.interval_ms == 0 {
            return Err(invalid("mover interval must be non-zero".into()));
        }
        if self.spawner.enabled && self.spawner.interval_ms == 0 {
            return Err(invalid("spawner interval must be non-zero".into()));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.playfield.width, self.playfield.height)
    }

    pub fn shot_cooldown(&self) -> Duration {
        Duration::from_millis(self.laser.cooldown_ms)
    }

    /// A config with no background workers and no seeded aliens, for driving
    /// the engine deterministically.
    pub fn quiet() -> Self {
        Self {
            seed: Some(0),
            aliens: AlienConfig {
                initial: 0,
                ..AlienConfig::default()
            },
            mover: MoverConfig {
                enabled: false,
                ..MoverConfig::default()
            },
            spawner: SpawnerConfig {
                enabled: false,
                ..SpawnerConfig::default()
            },
            ..Self::default()
        }
    }
}

fn invalid(msg: String) -> GameError {
    GameError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{MotionPolicy, MotionPreset};

    #[test]
    fn defaults_match_classic_layout() {
        let c = GameConfig::default();
        assert_eq!(c.bounds(), Vec2::new(800, 600));
        assert_eq!((c.player.start_x, c.player.start_y, c.player.size), (390, 550, 20));
        assert_eq!(c.shot_cooldown(), Duration::from_millis(200));
        assert_eq!(c.mover.interval_ms, 50);
        assert_eq!((c.spawner.interval_ms, c.spawner.count), (5000, 5));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = GameConfig::from_toml_str(
            r#"
            seed = 42

            [laser]
            cooldown_ms = 0

            [aliens]
            respawn_on_kill = true
            motion = "directional"
            "#,
        )
        .unwrap();
        assert_eq!(c.seed, Some(42));
        assert_eq!(c.laser.cooldown_ms, 0);
        assert_eq!(c.laser.speed, 5);
        assert!(c.aliens.respawn_on_kill);
        assert_eq!(c.aliens.motion, MotionTable::preset(MotionPreset::Directional));
        assert_eq!(c.aliens.motion.red, MotionPolicy::DirectionalStep { step: 32 });
    }

    #[test]
    fn rejects_zero_sized_player() {
        let err = GameConfig::from_toml_str("[player]\nsize = 0").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_alien_larger_than_playfield() {
        let err = GameConfig::from_toml_str("[playfield]\nwidth = 10\nheight = 10").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_interval_only_when_enabled() {
        assert!(GameConfig::from_toml_str("[mover]\ninterval_ms = 0").is_err());
        assert!(GameConfig::from_toml_str("[mover]\nenabled = false\ninterval_ms = 0").is_ok());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = GameConfig::from_toml_str("[laser\nspeed = 1").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, GameError::ConfigIo { .. }));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let c = GameConfig::from_toml_str(include_str!("../config/alien_invader.toml")).unwrap();
        assert_eq!(c, GameConfig::default());
    }

    #[test]
    fn quiet_config_disables_workers() {
        let c = GameConfig::quiet();
        assert!(!c.mover.enabled && !c.spawner.enabled);
        assert_eq!(c.aliens.initial, 0);
        assert!(c.validate().is_ok());
    }
}
