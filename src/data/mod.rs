//! Traffic data: the loaded historical table and a synthetic generator.

pub mod dataset;
pub mod sample;

pub use dataset::TrafficDataset;
pub use sample::{SampleConfig, generate_sample};
