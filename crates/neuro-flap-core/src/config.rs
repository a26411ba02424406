use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("gap_size ({gap_size}) must be smaller than screen_height ({screen_height})")]
    GapTooLarge { gap_size: f64, screen_height: f64 },
    #[error("malformed config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config file i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Game constants shared by every bird and pipe on the course.
///
/// Fields missing from a config file fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub pipe_width: f64,
    pub gap_size: f64,
    pub gravity: f64,
    /// Magnitude of the upward impulse; applied as a negative velocity.
    pub jump_velocity: f64,
    /// Horizontal distance a pipe travels per tick.
    pub pipe_speed: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 500,
            pipe_width: 80.0,
            gap_size: 150.0,
            gravity: 0.2,
            jump_velocity: 3.0,
            pipe_speed: 4.0,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("screen_width", f64::from(self.screen_width)),
            ("screen_height", f64::from(self.screen_height)),
            ("pipe_width", self.pipe_width),
            ("gap_size", self.gap_size),
            ("gravity", self.gravity),
            ("jump_velocity", self.jump_velocity),
            ("pipe_speed", self.pipe_speed),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.gap_size >= f64::from(self.screen_height) {
            return Err(ConfigError::GapTooLarge {
                gap_size: self.gap_size,
                screen_height: f64::from(self.screen_height),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Where new birds start: the screen centre, halved with integer division.
    pub fn spawn_point(&self) -> [f64; 2] {
        [
            f64::from(self.screen_width / 2),
            f64::from(self.screen_height / 2),
        ]
    }

    /// Per-tick survival reward in the fitness formula.
    pub fn survival_reward(&self) -> f64 {
        1.0 / f64::from(self.screen_width)
    }
}
