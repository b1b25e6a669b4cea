use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest grid the terminal renderer can lay out
pub const MAX_GRID_SIZE: usize = 256;

/// Configuration for the game
///
/// Fixed for the lifetime of a [`GameEngine`](super::GameEngine). Missing
/// fields in a JSON config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square, wrapping grid
    pub grid_size: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Tick interval at score 0, in milliseconds
    pub base_tick_ms: u64,
    /// Shortest tick interval, in milliseconds
    pub min_tick_ms: u64,
    /// Milliseconds removed from the interval per score bracket
    pub speed_gain_ms: u64,
    /// Score points per speed bracket
    pub speed_step_score: u32,
    /// Points awarded per food eaten
    pub score_increment: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 22,
            initial_snake_length: 3,
            base_tick_ms: 130,
            min_tick_ms: 72,
            speed_gain_ms: 2,
            speed_step_score: 40,
            score_increment: 10,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    pub fn base_tick(&self) -> Duration {
        Duration::from_millis(self.base_tick_ms)
    }

    pub fn min_tick(&self) -> Duration {
        Duration::from_millis(self.min_tick_ms)
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Validate configuration parameters
    ///
    /// Returns `Err` with a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_size < 3 {
            return Err(format!(
                "grid_size must be at least 3, got {}",
                self.grid_size
            ));
        }

        if self.grid_size > MAX_GRID_SIZE {
            return Err(format!(
                "grid_size must be at most {}, got {}",
                MAX_GRID_SIZE, self.grid_size
            ));
        }

        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        // The starting body trails left of the center cell.
        if self.initial_snake_length > self.grid_size / 2 + 1 {
            return Err(format!(
                "initial_snake_length ({}) does not fit a grid of size {}",
                self.initial_snake_length, self.grid_size
            ));
        }

        if self.min_tick_ms == 0 {
            return Err("min_tick_ms must be positive".to_string());
        }

        if self.min_tick_ms > self.base_tick_ms {
            return Err(format!(
                "min_tick_ms ({}) cannot exceed base_tick_ms ({})",
                self.min_tick_ms, self.base_tick_ms
            ));
        }

        if self.speed_step_score == 0 {
            return Err("speed_step_score must be at least 1".to_string());
        }

        if self.score_increment == 0 {
            return Err("score_increment must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 22);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.base_tick(), Duration::from_millis(130));
        assert_eq!(config.min_tick(), Duration::from_millis(72));
        assert_eq!(config.speed_gain_ms, 2);
        assert_eq!(config.speed_step_score, 40);
        assert_eq!(config.score_increment, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15);
        assert_eq!(config.grid_size, 15);
        assert_eq!(config.cell_count(), 225);
        assert_eq!(config.base_tick_ms, 130);
    }

    #[test]
    fn test_validation_rejects_tiny_grid() {
        let config = GameConfig::new(2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_caps_grid_size() {
        assert!(GameConfig::new(MAX_GRID_SIZE).validate().is_ok());

        let err = GameConfig::new(MAX_GRID_SIZE + 1).validate().unwrap_err();
        assert!(err.contains("grid_size"));

        assert!(GameConfig::new(usize::MAX).validate().is_err());
    }

    #[test]
    fn test_validation_min_tick_above_base() {
        let config = GameConfig {
            min_tick_ms: 200,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_snake_must_fit() {
        let config = GameConfig {
            grid_size: 4,
            initial_snake_length: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            grid_size: 4,
            initial_snake_length: 3,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_fields() {
        let mut config = GameConfig::default();
        config.speed_step_score = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.score_increment = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.initial_snake_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"grid_size": 30}"#).unwrap();
        assert_eq!(config.grid_size, 30);
        assert_eq!(config.base_tick_ms, 130);
        assert_eq!(config.score_increment, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snake.json");
        std::fs::write(&path, r#"{"grid_size": 16, "min_tick_ms": 60}"#).unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.grid_size, 16);
        assert_eq!(config.min_tick_ms, 60);

        assert!(GameConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
