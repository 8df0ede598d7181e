//! Regression model artifacts and the predictor built on them.
//!
//! Models are evaluated by small, pure functions so the predictor stays a thin
//! shape check around them.

pub mod model;
pub mod predictor;

pub use model::*;
pub use predictor::Predictor;
