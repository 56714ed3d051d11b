use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    AMBUSH_LOOKAHEAD, CAPTURE_SCORE, CONFIG_DEFAULT_PATH, CONFIG_ENV_VAR, FEARFUL_RADIUS,
    MAX_TICK_MS, MIN_TICK_MS, PELLET_SCORE, POWER_PELLET_SCORE, STARTING_LIVES, TICK_MS,
    VULNERABLE_DURATION_MS, WANDER_TURN_CHANCE,
};
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pathing {
    #[default]
    Greedy,
    Bfs,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrightenedPolicy {
    #[default]
    Flee,
    Random,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tick_ms: u64,
    pub vulnerable_duration_ms: u64,
    pub starting_lives: u32,
    /// Cells ahead of the player that an Ambusher aims for.
    pub ambush_lookahead: i32,
    /// Manhattan distance under which a Fearful pursuer runs away.
    pub fearful_radius: i32,
    /// Per-tick chance that a wandering pursuer picks a new heading.
    pub wander_turn_chance: f32,
    pub pathing: Pathing,
    pub frightened: FrightenedPolicy,
    pub pellet_score: u32,
    pub power_pellet_score: u32,
    pub capture_score: u32,
    pub seed: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            vulnerable_duration_ms: VULNERABLE_DURATION_MS,
            starting_lives: STARTING_LIVES,
            ambush_lookahead: AMBUSH_LOOKAHEAD,
            fearful_radius: FEARFUL_RADIUS,
            wander_turn_chance: WANDER_TURN_CHANCE,
            pathing: Pathing::Greedy,
            frightened: FrightenedPolicy::Flee,
            pellet_score: PELLET_SCORE,
            power_pellet_score: POWER_PELLET_SCORE,
            capture_score: CAPTURE_SCORE,
            seed: 1,
        }
    }
}

impl SimConfig {
    /// Load config from the env-named file or `config/sim.toml`, falling back
    /// to defaults when neither is usable.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            match Self::from_file(Path::new(&path)) {
                Ok(config) => return config,
                Err(error) => tracing::warn!(%error, "ignoring config from {CONFIG_ENV_VAR}"),
            }
        }
        let default_path = Path::new(CONFIG_DEFAULT_PATH);
        if default_path.is_file() {
            match Self::from_file(default_path) {
                Ok(config) => return config,
                Err(error) => tracing::warn!(%error, "ignoring {CONFIG_DEFAULT_PATH}"),
            }
        }
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&self.tick_ms) {
            return Err(ConfigError::Invalid(format!(
                "tick_ms must be within {MIN_TICK_MS}..={MAX_TICK_MS}, got {}",
                self.tick_ms
            )));
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::Invalid(
                "starting_lives must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.wander_turn_chance) {
            return Err(ConfigError::Invalid(format!(
                "wander_turn_chance must be within 0..=1, got {}",
                self.wander_turn_chance
            )));
        }
        if self.ambush_lookahead < 0 || self.fearful_radius < 0 {
            return Err(ConfigError::Invalid(
                "ambush_lookahead and fearful_radius must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = SimConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.pathing, Pathing::Greedy);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = SimConfig::from_toml_str(
            r#"
tick_ms = 100
pathing = "bfs"
frightened = "random"
"#,
        )
        .expect("config parses");
        assert_eq!(config.tick_ms, 100);
        assert_eq!(config.pathing, Pathing::Bfs);
        assert_eq!(config.frightened, FrightenedPolicy::Random);
        assert_eq!(config.vulnerable_duration_ms, VULNERABLE_DURATION_MS);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            SimConfig::from_toml_str("tick_ms = 5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_toml_str("starting_lives = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_toml_str("wander_turn_chance = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            SimConfig::from_toml_str("pathing = \"teleport\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("packman-sim-no-such-config.toml");
        assert!(matches!(
            SimConfig::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
