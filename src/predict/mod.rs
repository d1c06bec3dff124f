//! Prediction pipeline
//!
//! Encode, assemble and delegate to the loaded model.

pub mod inference;

pub use inference::{constructor_asset, format_prediction, Predictor};
