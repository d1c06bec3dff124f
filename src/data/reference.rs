//! Reference dataset: the tabular sample used to derive category dictionaries
//!
//! Dictionaries must be built from the same sample the model was trained
//! against, so the loader validates the expected columns exist and otherwise
//! leaves the data alone.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::{PodiumError, Result};

/// Categorical columns the dictionaries are built from
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["driverRef", "nationality", "constructorRef"];

/// Numeric columns consumed directly as model inputs
pub const NUMERIC_COLUMNS: [&str; 4] = ["grid", "points", "rank", "laps"];

/// One row of the reference sample
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceRow {
    pub grid: f32,
    #[serde(rename = "driverRef")]
    pub driver: String,
    pub nationality: String,
    #[serde(rename = "constructorRef")]
    pub constructor: String,
    pub points: f32,
    pub rank: f32,
    pub laps: f32,
}

/// Summary counts for the `data status` command
#[derive(Debug, Clone, Copy)]
pub struct ReferenceStats {
    pub row_count: usize,
    pub driver_count: usize,
    pub nationality_count: usize,
    pub constructor_count: usize,
}

/// In-memory reference dataset, loaded once at startup
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    rows: Vec<ReferenceRow>,
}

impl ReferenceDataset {
    /// Load the reference CSV from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load the reference CSV from any reader (used by tests with in-memory
    /// fixtures)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        // Header check up front so a misshapen file fails with the column
        // name, not a row-level deserialization error
        let headers = csv_reader.headers()?.clone();
        for required in CATEGORICAL_COLUMNS.iter().chain(NUMERIC_COLUMNS.iter()) {
            if !headers.iter().any(|h| h == *required) {
                return Err(PodiumError::MissingColumn(required.to_string()));
            }
        }

        let mut rows = Vec::new();
        for record in csv_reader.deserialize() {
            let row: ReferenceRow = record?;
            rows.push(row);
        }

        Ok(ReferenceDataset { rows })
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw driver values, one per row (the dictionary collapses duplicates)
    pub fn driver_values(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.driver.as_str())
    }

    pub fn nationality_values(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.nationality.as_str())
    }

    pub fn constructor_values(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.constructor.as_str())
    }

    /// Summary counts over the loaded sample
    pub fn stats(&self) -> ReferenceStats {
        ReferenceStats {
            row_count: self.rows.len(),
            driver_count: self.driver_values().collect::<BTreeSet<_>>().len(),
            nationality_count: self.nationality_values().collect::<BTreeSet<_>>().len(),
            constructor_count: self.constructor_values().collect::<BTreeSet<_>>().len(),
        }
    }
}
