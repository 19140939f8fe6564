//! Tuning loaded from TOML and validated before a session starts.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}")]
    Read {
        /// Location that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration text is not valid TOML for [`GameConfig`].
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// A value is outside the range the simulation accepts.
    #[error("`{field}` must be {expected} (received {value})")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable description of the accepted range.
        expected: &'static str,
        /// Value found in the configuration.
        value: f64,
    },
}

/// Complete tuning for a game session.
///
/// Every section falls back to its defaults, so an empty document is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Master seed from which every random stream is derived.
    pub seed: u64,
    /// Falling piece tuning.
    pub piece: PieceSection,
    /// Enemy tuning.
    pub enemy: EnemySection,
    /// Weapon tuning.
    pub combat: CombatSection,
    /// Player movement tuning.
    pub player: PlayerSection,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5b1d_6e5e_17a3_c0de,
            piece: PieceSection::default(),
            enemy: EnemySection::default(),
            combat: CombatSection::default(),
            player: PlayerSection::default(),
        }
    }
}

/// Falling piece tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PieceSection {
    /// Idle time before the next piece spawns.
    pub spawn_interval_secs: f32,
    /// Gravity in layers per second.
    pub fall_speed: f32,
    /// Time a blocked piece waits before locking.
    pub lock_delay_secs: f32,
    /// Chance that a refill is a floor-tiling batch.
    pub perfect_floor_probability: f64,
}

impl Default for PieceSection {
    fn default() -> Self {
        Self {
            spawn_interval_secs: 1.0,
            fall_speed: 60.0,
            lock_delay_secs: 0.5,
            perfect_floor_probability: 0.95,
        }
    }
}

/// Enemy tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemySection {
    /// Movement speed in world units per second.
    pub speed: f32,
}

impl Default for EnemySection {
    fn default() -> Self {
        Self { speed: 80.0 }
    }
}

/// Weapon tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombatSection {
    /// Bullet speed in world units per second.
    pub bullet_speed: f32,
    /// Grenade launch speed along the aim.
    pub grenade_speed: f32,
    /// Extra upward launch velocity given to grenades.
    pub grenade_lift: f32,
    /// Downward acceleration applied to grenades.
    pub grenade_gravity: f32,
    /// Minimum time between assisted shots in cheat mode.
    pub cheat_fire_interval_secs: f32,
}

impl Default for CombatSection {
    fn default() -> Self {
        Self {
            bullet_speed: 400.0,
            grenade_speed: 300.0,
            grenade_lift: 200.0,
            grenade_gravity: 500.0,
            cheat_fire_interval_secs: 0.15,
        }
    }
}

/// Player movement tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerSection {
    /// Walking speed in world units per second.
    pub move_speed: f32,
    /// Aim turn rate in degrees per second.
    pub turn_speed: f32,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            move_speed: 150.0,
            turn_speed: 120.0,
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that every tunable lies in its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("piece.spawn_interval_secs", self.piece.spawn_interval_secs)?;
        positive("piece.fall_speed", self.piece.fall_speed)?;
        non_negative("piece.lock_delay_secs", self.piece.lock_delay_secs)?;
        let probability = self.piece.perfect_floor_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::Invalid {
                field: "piece.perfect_floor_probability",
                expected: "within [0, 1]",
                value: probability,
            });
        }
        positive("enemy.speed", self.enemy.speed)?;
        positive("combat.bullet_speed", self.combat.bullet_speed)?;
        positive("combat.grenade_speed", self.combat.grenade_speed)?;
        non_negative("combat.grenade_lift", self.combat.grenade_lift)?;
        non_negative("combat.grenade_gravity", self.combat.grenade_gravity)?;
        positive(
            "combat.cheat_fire_interval_secs",
            self.combat.cheat_fire_interval_secs,
        )?;
        positive("player.move_speed", self.player.move_speed)?;
        positive("player.turn_speed", self.player.turn_speed)
    }

    pub(crate) fn spawn_interval(&self) -> Duration {
        seconds(self.piece.spawn_interval_secs)
    }

    pub(crate) fn lock_delay(&self) -> Duration {
        seconds(self.piece.lock_delay_secs)
    }

    pub(crate) fn cheat_fire_interval(&self) -> Duration {
        seconds(self.combat.cheat_fire_interval_secs)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            expected: "a positive finite number",
            value: f64::from(value),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            expected: "a finite number no smaller than zero",
            value: f64::from(value),
        })
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GameConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.spawn_interval(), Duration::from_secs(1));
        assert_eq!(config.lock_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
                seed = 7

                [piece]
                fall_speed = 8.0

                [combat]
                grenade_gravity = 0.0
            "#,
        )
        .expect("partial config is valid");

        assert_eq!(config.seed, 7);
        assert!((config.piece.fall_speed - 8.0).abs() < f32::EPSILON);
        assert!((config.piece.perfect_floor_probability - 0.95).abs() < f64::EPSILON);
        assert!(config.combat.grenade_gravity.abs() < f32::EPSILON);
        assert_eq!(config.player, PlayerSection::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let error = GameConfig::from_toml_str("[piece]\nperfect_floor_probability = 1.5")
            .expect_err("probability above one");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "piece.perfect_floor_probability",
                ..
            }
        ));

        let error = GameConfig::from_toml_str("[piece]\nspawn_interval_secs = 0.0")
            .expect_err("zero interval");
        assert_eq!(
            error.to_string(),
            "`piece.spawn_interval_secs` must be a positive finite number (received 0)"
        );
    }

    #[test]
    fn unknown_keys_and_bad_types_fail_to_parse() {
        assert!(matches!(
            GameConfig::from_toml_str("[enemy]\nsped = 3.0"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("seed = \"abc\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn shipped_config_matches_the_defaults() {
        let shipped = include_str!("../../sky-bridge-siege.toml");
        let config = GameConfig::from_toml_str(shipped).expect("shipped config is valid");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn missing_files_report_their_path() {
        let path = Path::new("definitely/not/here.toml");
        let error = GameConfig::load(path).expect_err("missing file");
        match error {
            ConfigError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
