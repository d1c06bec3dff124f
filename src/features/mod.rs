//! Feature encoding and decoding
//!
//! Translates raw race attributes into model-ready features and back.

pub mod codec;
pub mod vector;

pub use codec::{CategoryDictionary, UnknownCategoryPolicy};
pub use vector::{FeatureSchema, FeatureVector};
