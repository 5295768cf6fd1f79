//! Booster counts and their persistence
//!
//! Counts survive between levels and sessions. The session only talks to a
//! [`BoosterStore`]; the binary plugs in the JSON file store, tests use the
//! in-memory one.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

const FILENAME: &str = "boosters.json";

/// Remaining uses of each booster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boosters {
    /// Row/column shuffle
    pub shuffle: u32,
    /// Colour eraser
    pub color_bomb: u32,
}

impl Default for Boosters {
    fn default() -> Self {
        Self {
            shuffle: 1,
            color_bomb: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no config directory on this platform")]
    NoConfigDir,
}

/// Key-value backend for booster counts
pub trait BoosterStore {
    /// Stored counts, or the defaults when nothing usable is stored
    fn load(&self) -> Boosters;
    /// Write the counts through immediately
    fn save(&mut self, boosters: &Boosters) -> Result<(), StoreError>;
}

/// Counts stored as JSON in the config directory
#[derive(Debug, Clone)]
pub struct JsonBoosterStore {
    path: Option<PathBuf>,
}

impl JsonBoosterStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Store next to the settings file
    pub fn in_config_dir() -> Self {
        match ProjectDirs::from("com", "sweetswap", "sweetswap") {
            Some(dirs) => Self::new(dirs.config_dir().join(FILENAME)),
            None => Self { path: None },
        }
    }
}

impl BoosterStore for JsonBoosterStore {
    fn load(&self) -> Boosters {
        let Some(path) = &self.path else {
            return Boosters::default();
        };
        let Ok(contents) = fs::read_to_string(path) else {
            return Boosters::default();
        };
        match serde_json::from_str(&contents) {
            Ok(boosters) => boosters,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt booster file, using defaults");
                Boosters::default()
            }
        }
    }

    fn save(&mut self, boosters: &Boosters) -> Result<(), StoreError> {
        let path = self.path.as_ref().ok_or(StoreError::NoConfigDir)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string(boosters)?)?;
        Ok(())
    }
}

/// Volatile store, starts empty
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stored: Option<Boosters>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with counts
    pub fn with(boosters: Boosters) -> Self {
        Self {
            stored: Some(boosters),
        }
    }
}

#[cfg(test)]
impl BoosterStore for MemoryStore {
    fn load(&self) -> Boosters {
        self.stored.unwrap_or_default()
    }

    fn save(&mut self, boosters: &Boosters) -> Result<(), StoreError> {
        self.stored = Some(*boosters);
        Ok(())
    }
}
