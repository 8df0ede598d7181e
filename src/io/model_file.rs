//! Read model artifact JSON files.
//!
//! The schema is defined by `models::ModelArtifact`. Reading only checks that
//! the file exists and is well-formed JSON of that shape; compatibility checks
//! happen in `Predictor::from_artifact`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::AppError;
use crate::models::ModelArtifact;

/// Read a model artifact from disk.
pub fn read_model_artifact(path: &Path) -> Result<ModelArtifact, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::model_load(format!("Failed to open model artifact '{}': {e}", path.display()))
    })?;
    parse_model_artifact(BufReader::new(file))
        .map_err(|e| AppError::model_load(format!("{e} ({})", path.display())))
}

/// Parse a model artifact from any reader.
pub fn parse_model_artifact<R: Read>(source: R) -> Result<ModelArtifact, AppError> {
    serde_json::from_reader(source)
        .map_err(|e| AppError::model_load(format!("Corrupted or incompatible model artifact: {e}")))
}
