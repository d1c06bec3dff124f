//! Fixed-order feature vectors for model input
//!
//! The model receives positional, not named, input: field order is part of
//! the model version and reordering silently changes its semantics.

use serde::{Deserialize, Serialize};

use crate::{PodiumError, Result};

/// Ordered field names for one model version.
///
/// Sourced from the model artifact's metadata so the vector layout always
/// matches what the artifact was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    fields: Vec<String>,
}

impl FeatureSchema {
    /// The canonical seven-field order for position models
    pub const CANONICAL: [&'static str; 7] = [
        "grid",
        "driver_code",
        "nationality_code",
        "constructor_code",
        "points",
        "fastest_lap_rank",
        "laps",
    ];

    pub fn new(fields: Vec<String>) -> Self {
        FeatureSchema { fields }
    }

    pub fn canonical() -> Self {
        FeatureSchema {
            fields: Self::CANONICAL.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of model inputs
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of a named field, if present
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }
}

/// An ordered sequence of numeric model inputs
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// Assemble a vector from fields already in model order.
    ///
    /// Pure concatenation: the only check is that the field count matches the
    /// model's expected input arity.
    pub fn assemble(fields: Vec<f32>, expected_arity: usize) -> Result<Self> {
        if fields.len() != expected_arity {
            return Err(PodiumError::FeatureArityMismatch {
                got: fields.len(),
                expected: expected_arity,
            });
        }
        Ok(FeatureVector { values: fields })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
