//! Shared dashboard pipeline used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load dataset + model once -> build aggregate views per render -> predict on demand
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::info;

use crate::data::TrafficDataset;
use crate::domain::{AggregateView, DashboardConfig, DatasetSummary, GroupKey, PredictionRequest, PredictionResult};
use crate::error::AppError;
use crate::models::Predictor;

/// Everything loaded at startup, owned for the process lifetime.
///
/// Read-only after construction; the dataset and predictor never talk to
/// each other.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    pub dataset: TrafficDataset,
    pub predictor: Predictor,
}

/// All values one render of the dashboard displays.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub summary: DatasetSummary,
    /// One view per [`GroupKey::ALL`] entry, in that order.
    pub views: Vec<AggregateView>,
    pub years: Vec<i32>,
    pub junctions: Vec<i64>,
}

impl DashboardView {
    pub fn view(&self, key: GroupKey) -> Option<&AggregateView> {
        self.views.iter().find(|v| v.key == key)
    }
}

/// Load the dataset and the model. Any failure aborts startup.
pub fn load_context(config: &DashboardConfig) -> Result<DashboardContext, AppError> {
    let dataset = TrafficDataset::load(&config.data_path)?;
    let predictor = Predictor::load(&config.model_path)?;
    Ok(DashboardContext { dataset, predictor })
}

impl DashboardContext {
    /// Recompute every aggregate from scratch.
    pub fn build_view(&self) -> DashboardView {
        build_view(&self.dataset)
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, AppError> {
        self.predictor.predict(request)
    }
}

/// Recompute every aggregate the dashboard shows.
pub fn build_view(dataset: &TrafficDataset) -> DashboardView {
    let views = GroupKey::ALL.iter().map(|&key| dataset.sum_by(key)).collect();
    DashboardView {
        summary: dataset.summary(),
        views,
        years: dataset.unique_years(),
        junctions: dataset.unique_junctions(),
    }
}

/// Initial selection: the configured hour/day/month, the first year and the
/// first junction in the dataset.
pub fn initial_request(config: &DashboardConfig, view: &DashboardView) -> PredictionRequest {
    PredictionRequest {
        year: view.years.first().copied().unwrap_or(config.initial.year),
        junction: view.junctions.first().copied().unwrap_or(config.initial.junction),
        ..config.initial
    }
}

/// Log the loaded context once at startup.
pub fn log_context(ctx: &DashboardContext) {
    let summary = ctx.dataset.summary();
    info!(
        records = summary.n_records,
        total = summary.total_vehicles,
        junctions = ctx.dataset.unique_junctions().len(),
        model = %ctx.predictor.describe(),
        "dashboard context ready"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn view_has_one_aggregate_per_key() {
        let csv = "DateTime,Junction,Vehicles\n\
                   2016-01-01 08:00:00,3,10\n\
                   2017-01-01 08:00:00,1,20\n";
        let ds = TrafficDataset::from_reader(csv.as_bytes()).unwrap();
        let view = build_view(&ds);
        assert_eq!(view.views.len(), 4);
        assert_eq!(view.view(GroupKey::Year).unwrap().get(2017), Some(20));
        assert_eq!(view.years, vec![2016, 2017]);
        assert_eq!(view.junctions, vec![1, 3]);
    }

    #[test]
    fn initial_request_uses_first_year_and_junction() {
        let csv = "DateTime,Junction,Vehicles\n2016-01-01 08:00:00,3,10\n2015-01-01 08:00:00,2,1\n";
        let ds = TrafficDataset::from_reader(csv.as_bytes()).unwrap();
        let config = DashboardConfig {
            data_path: PathBuf::from("traffic.csv"),
            model_path: PathBuf::from("traffic_model.json"),
            initial: PredictionRequest { hour: 10, day: 15, month: 6, year: 0, junction: 0 },
        };
        let req = initial_request(&config, &build_view(&ds));
        assert_eq!(req, PredictionRequest { hour: 10, day: 15, month: 6, year: 2015, junction: 2 });
    }
}
