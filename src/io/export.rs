//! CSV writers: aggregate views and (synthetic) traffic tables.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{AggregateView, TrafficRecord};
use crate::error::AppError;

/// Timestamp layout used when writing traffic tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write the given views to one CSV file in long format: `group,key,vehicles`.
pub fn write_aggregates_csv(path: &Path, views: &[AggregateView]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_aggregates(file, views)
}

pub fn write_aggregates<W: Write>(sink: W, views: &[AggregateView]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer
        .write_record(["group", "key", "vehicles"])
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for view in views {
        for (key, vehicles) in view.iter() {
            writer
                .write_record([view.key.label().to_string(), key.to_string(), vehicles.to_string()])
                .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))
}

/// Write a traffic table with the same columns the loader requires.
pub fn write_dataset_csv(path: &Path, records: &[TrafficRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create dataset CSV '{}': {e}", path.display())))?;
    write_dataset(file, records)
}

pub fn write_dataset<W: Write>(sink: W, records: &[TrafficRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer
        .write_record(["DateTime", "Junction", "Vehicles"])
        .map_err(|e| AppError::io(format!("Failed to write dataset CSV header: {e}")))?;

    for r in records {
        writer
            .write_record([
                r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                r.junction.to_string(),
                r.vehicles.to_string(),
            ])
            .map_err(|e| AppError::io(format!("Failed to write dataset CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush dataset CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GroupKey;

    #[test]
    fn aggregates_are_written_in_long_format() {
        let mut view = AggregateView::new(GroupKey::Junction);
        view.groups.insert(2, 5);
        view.groups.insert(1, 30);

        let mut buf = Vec::new();
        write_aggregates(&mut buf, &[view]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "group,key,vehicles\njunction,1,30\njunction,2,5\n");
    }
}
