//! The historical traffic table and its grouped views.
//!
//! `TrafficDataset` is built once at startup and never mutated afterwards.
//! Every query below reads the records and builds a fresh result; nothing is
//! cached and no intermediate state is shared between queries.
//!
//! The vehicle total of a dataset always fits in a `u64`; construction fails
//! otherwise. Every grouped sum is bounded by that total.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::{AggregateView, DatasetSummary, GroupKey, TimeFields, TrafficRecord};
use crate::error::AppError;
use crate::io::ingest;

#[derive(Debug, Clone, Default)]
pub struct TrafficDataset {
    records: Vec<TrafficRecord>,
}

impl TrafficDataset {
    /// Load and validate a traffic CSV from disk.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let dataset = Self::from_records(ingest::load_records(path)?)?;
        info!(path = %path.display(), records = dataset.len(), "loaded traffic dataset");
        Ok(dataset)
    }

    /// Load and validate a traffic CSV from any reader.
    pub fn from_reader<R: Read>(source: R) -> Result<Self, AppError> {
        Self::from_records(ingest::read_records(source)?)
    }

    /// Fails with a `Parse` error if the vehicle counts add up past `u64::MAX`.
    pub fn from_records(records: Vec<TrafficRecord>) -> Result<Self, AppError> {
        let mut total: u64 = 0;
        for (i, r) in records.iter().enumerate() {
            total = total.checked_add(r.vehicles).ok_or_else(|| {
                AppError::parse(format!(
                    "Record {}: total `Vehicles` exceeds {} and cannot be aggregated.",
                    i + 1,
                    u64::MAX
                ))
            })?;
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TrafficRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Calendar fields for every record, in record order.
    pub fn derive_time_fields(&self) -> Vec<TimeFields> {
        self.records.iter().map(TrafficRecord::time_fields).collect()
    }

    /// Sum `vehicles` per distinct value of `key`.
    pub fn sum_by(&self, key: GroupKey) -> AggregateView {
        let mut view = AggregateView::new(key);
        for r in &self.records {
            *view.groups.entry(key.key_of(r)).or_insert(0) += r.vehicles;
        }
        debug!(key = key.label(), groups = view.len(), "aggregated vehicles");
        view
    }

    pub fn total_vehicles(&self) -> u64 {
        self.records.iter().map(|r| r.vehicles).sum()
    }

    pub fn mean_vehicles(&self) -> Result<f64, AppError> {
        if self.records.is_empty() {
            return Err(AppError::empty_dataset(
                "Cannot compute mean vehicles: the dataset has no records.",
            ));
        }
        Ok(self.total_vehicles() as f64 / self.records.len() as f64)
    }

    /// Distinct years, ascending.
    pub fn unique_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.records.iter().map(|r| r.time_fields().year).collect();
        years.into_iter().collect()
    }

    /// Distinct junction ids, ascending.
    pub fn unique_junctions(&self) -> Vec<i64> {
        let junctions: BTreeSet<i64> = self.records.iter().map(|r| r.junction).collect();
        junctions.into_iter().collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            n_records: self.records.len(),
            first: self.records.iter().map(|r| r.timestamp).min(),
            last: self.records.iter().map(|r| r.timestamp).max(),
            total_vehicles: self.total_vehicles(),
            mean_vehicles: self.mean_vehicles().ok(),
        }
    }
}
