//! Input/output helpers.
//!
//! - traffic CSV ingest + validation (`ingest`)
//! - CSV exports: aggregates and traffic tables (`export`)
//! - model artifact JSON reading (`model_file`)

pub mod export;
pub mod ingest;
pub mod model_file;

pub use export::*;
pub use ingest::*;
pub use model_file::*;
