use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, GameError};
use crate::schedule::{RoundSchedule, FIRST_DELAY_MS, VISIBLE_MS};
use crate::stimulus::{Variant, BAD_FREQUENCY};

/// User-editable settings, stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub variant: String,
    pub first_delay_ms: u64,
    pub visible_ms: u64,
    pub rounds: RoundSchedule,
    pub bad_frequency: f64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::Letter.to_string(),
            first_delay_ms: FIRST_DELAY_MS,
            visible_ms: VISIBLE_MS,
            rounds: RoundSchedule::default(),
            bad_frequency: BAD_FREQUENCY,
            seed: None,
        }
    }
}

/// Validated settings a game can be built from
#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    pub variant: Variant,
    pub first_delay_ms: u64,
    pub visible_ms: u64,
    pub schedule: RoundSchedule,
    pub bad_frequency: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            variant: Variant::Letter,
            first_delay_ms: FIRST_DELAY_MS,
            visible_ms: VISIBLE_MS,
            schedule: RoundSchedule::default(),
            bad_frequency: BAD_FREQUENCY,
        }
    }
}

impl GameSettings {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        if !(0.0..=1.0).contains(&self.bad_frequency) {
            return Err(ConfigError::BadFrequency(self.bad_frequency));
        }
        for (round, spec) in self.schedule.rounds().iter().enumerate() {
            if spec.item_count == 0 {
                return Err(ConfigError::EmptyRound(round));
            }
            // hide must fire before the next item is shown
            if self.visible_ms >= spec.inter_item_delay_ms {
                return Err(ConfigError::VisibleNotShorterThanDelay {
                    visible_ms: self.visible_ms,
                    delay_ms: spec.inter_item_delay_ms,
                    round,
                });
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn to_settings(&self) -> Result<GameSettings, GameError> {
        let settings = GameSettings {
            variant: self.variant.parse()?,
            first_delay_ms: self.first_delay_ms,
            visible_ms: self.visible_ms,
            schedule: self.rounds.clone(),
            bad_frequency: self.bad_frequency,
        };
        settings.validate()?;
        Ok(settings)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "focustap") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("focustap_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("ignoring unreadable config {}: {}", self.path.display(), e);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
