// src/config.rs
use anyhow::{Context, Result};
use error::GameError;
use save::SaveFormat;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Engine and storage settings. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_width: i32,
    pub board_height: i32,
    pub fov_radius: u32,
    pub min_floors: u32,
    pub max_floors: u32,
    pub inventory_capacity: usize,
    pub min_mutation_choices: usize,
    pub max_mutation_choices: usize,
    pub save_dir: PathBuf,
    pub save_format: SaveFormat,
    /// Fixed run seed; random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 32,
            board_height: 18,
            fov_radius: 8,
            min_floors: 10,
            max_floors: 15,
            inventory_capacity: 24,
            min_mutation_choices: 2,
            max_mutation_choices: 2,
            save_dir: PathBuf::from("saves"),
            save_format: SaveFormat::Json,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reads a JSON config; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).context(format!("Failed to read config {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&text).context(format!("Failed to parse config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays `TITAN_*` environment variables on top of `self`
    pub fn from_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = lookup("TITAN_SAVE_DIR") {
            self.save_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup("TITAN_SEED") {
            self.seed = Some(parse_var("TITAN_SEED", &seed)?);
        }
        if let Some(width) = lookup("TITAN_BOARD_WIDTH") {
            self.board_width = parse_var("TITAN_BOARD_WIDTH", &width)?;
        }
        if let Some(height) = lookup("TITAN_BOARD_HEIGHT") {
            self.board_height = parse_var("TITAN_BOARD_HEIGHT", &height)?;
        }
        if let Some(format) = lookup("TITAN_SAVE_FORMAT") {
            self.save_format = parse_var("TITAN_SAVE_FORMAT", &format)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.board_width < 5 || self.board_height < 5 {
            return Err(GameError::ConfigError(format!(
                "board {}x{} is smaller than 5x5",
                self.board_width, self.board_height
            )));
        }
        if self.min_floors == 0 || self.min_floors > self.max_floors {
            return Err(GameError::ConfigError(format!(
                "floor range {}..={} is empty",
                self.min_floors, self.max_floors
            )));
        }
        if self.min_mutation_choices > self.max_mutation_choices {
            return Err(GameError::ConfigError("mutation choice range is empty".into()));
        }
        if self.inventory_capacity == 0 {
            return Err(GameError::ConfigError("inventory capacity must be positive".into()));
        }
        Ok(())
    }

    pub fn max_floor_range(&self) -> RangeInclusive<u32> {
        self.min_floors..=self.max_floors
    }

    pub fn mutation_choice_range(&self) -> RangeInclusive<usize> {
        self.min_mutation_choices..=self.max_mutation_choices
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, GameError> {
    value
        .trim()
        .parse()
        .map_err(|_| GameError::ConfigError(format!("{key}={value:?} is not valid")))
}
