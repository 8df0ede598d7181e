//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the historical record and its derived calendar fields (`TrafficRecord`, `TimeFields`)
//! - grouped sums (`GroupKey`, `AggregateView`)
//! - the prediction contract (`PredictionRequest`, `FeatureVector`, `PredictionResult`)

pub mod types;

pub use types::*;
