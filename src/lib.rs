//! Race finishing-position prediction
//!
//! Encodes human-entered race attributes into the fixed-order feature vector
//! a pre-trained regression artifact expects, and decodes coded values back
//! to display labels.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use features::codec::UnknownCategoryPolicy;

/// Integer code assigned to a categorical value by a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryCode(pub i64);

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw, human-entered attributes for one prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceInputs {
    /// Starting position on the grid (1 = pole)
    pub grid: u32,
    /// Driver reference, e.g. "hamilton"
    pub driver: String,
    /// Driver nationality, e.g. "British"
    pub nationality: String,
    /// Constructor name, e.g. "Ferrari"
    pub constructor: String,
    /// Championship points scored before the race
    pub points: f32,
    /// Fastest-lap rank (1 = fastest)
    pub fastest_lap_rank: u32,
    /// Laps completed
    pub laps: u32,
}

/// Model prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Raw model output: predicted finishing position
    pub position: f32,
    /// Starting grid position, echoed for display
    pub grid: u32,
    /// Laps completed, echoed for display
    pub laps: u32,
}

impl Prediction {
    /// Finishing position as displayed: rounded, never below 1
    pub fn display_position(&self) -> u32 {
        self.position.round().max(1.0) as u32
    }

    /// Positions gained (positive) or lost relative to the starting grid
    pub fn positions_gained(&self) -> i32 {
        self.grid as i32 - self.display_position() as i32
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum PodiumError {
    #[error("Reference column '{column}' has no values to build a dictionary from")]
    EmptyReferenceData { column: String },

    #[error("Unknown {column} value: '{value}'")]
    UnknownCategory { column: String, value: String },

    #[error("Code {code} is outside the dictionary range 0..{size}")]
    InvalidCode { code: i64, size: usize },

    #[error("Feature vector has {got} fields, model expects {expected}")]
    FeatureArityMismatch { got: usize, expected: usize },

    #[error("Reference dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid model artifact: {0}")]
    Artifact(String),

    #[error("Model artifact not found - check [model] artifact_path in config")]
    NoModel,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PodiumError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub encoding: EncodingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub reference_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub artifact_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// "strict" surfaces unknown categories as errors; "sentinel" maps them
    /// to `sentinel_code`. Applied uniformly to every categorical field.
    pub unknown_category: UnknownCategoryMode,
    pub sentinel_code: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategoryMode {
    Strict,
    Sentinel,
}

impl EncodingConfig {
    pub fn policy(&self) -> UnknownCategoryPolicy {
        match self.unknown_category {
            UnknownCategoryMode::Strict => UnknownCategoryPolicy::Strict,
            UnknownCategoryMode::Sentinel => {
                UnknownCategoryPolicy::Sentinel(CategoryCode(self.sentinel_code))
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                reference_path: "data/sample_data.csv".to_string(),
            },
            model: ModelConfig {
                artifact_path: "model/position_model.json".to_string(),
            },
            encoding: EncodingConfig {
                unknown_category: UnknownCategoryMode::Strict,
                sentinel_code: -1,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PodiumError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| PodiumError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PodiumError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
