//! Formatted terminal output: KPIs, aggregate tables, predictions.
//!
//! We keep formatting code in one place so:
//! - the dataset/model code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{AggregateView, DatasetSummary, GroupKey, PredictionRequest, PredictionResult};

/// Format the run header: dataset span, KPIs, and model.
pub fn format_run_summary(summary: &DatasetSummary, model: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str("=== traffic - Smart Traffic Dashboard ===\n");
    out.push_str(&format!("Records: {}\n", summary.n_records));
    if let (Some(first), Some(last)) = (summary.first, summary.last) {
        out.push_str(&format!("Span: {first} -> {last}\n"));
    }
    if let Some(model) = model {
        out.push_str(&format!("Model: {model}\n"));
    }
    out.push('\n');
    out.push_str(&format!("Total Traffic: {}\n", summary.total_vehicles));
    out.push_str(&format!("Average Traffic: {}\n", fmt_mean(summary.mean_vehicles)));

    out
}

/// Mean vehicles rounded to two decimals, or `-` for an empty dataset.
pub fn fmt_mean(mean: Option<f64>) -> String {
    match mean {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Two-column table of one aggregate view, ascending keys.
pub fn format_aggregate_table(view: &AggregateView) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}:\n", view.key.title()));
    out.push_str(&format!("{:<10} {:>12}\n", view.key.label(), "vehicles"));
    out.push_str(&format!("{:-<10} {:-<12}\n", "", ""));

    if view.is_empty() {
        out.push_str("(no records)\n");
        return out;
    }

    for (key, vehicles) in view.iter() {
        out.push_str(&format!("{:<10} {:>12}\n", fmt_key(view.key, key), vehicles));
    }
    out
}

/// Key label for display; months get their short English name.
pub fn fmt_key(group: GroupKey, key: i64) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    match group {
        GroupKey::Month if (1..=12).contains(&key) => MONTHS[(key - 1) as usize].to_string(),
        _ => key.to_string(),
    }
}

pub fn format_request(request: &PredictionRequest) -> String {
    format!(
        "hour={} day={} month={} year={} junction={}",
        request.hour, request.day, request.month, request.year, request.junction
    )
}

pub fn format_prediction(result: &PredictionResult) -> String {
    format!("Predicted Traffic: {result}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_keys_in_order() {
        let mut view = AggregateView::new(GroupKey::Month);
        view.groups.insert(2, 5);
        view.groups.insert(1, 30);
        let txt = format_aggregate_table(&view);
        let expected = concat!(
            "Monthly Traffic Analysis:\n",
            "month          vehicles\n",
            "---------- ------------\n",
            "Jan                  30\n",
            "Feb                   5\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_dataset_mean_is_dash() {
        let summary = DatasetSummary {
            n_records: 0,
            first: None,
            last: None,
            total_vehicles: 0,
            mean_vehicles: None,
        };
        let txt = format_run_summary(&summary, Some("linear (5 features)"));
        assert!(txt.contains("Total Traffic: 0\n"));
        assert!(txt.contains("Average Traffic: -\n"));
        assert!(txt.contains("Model: linear (5 features)\n"));
    }

    #[test]
    fn prediction_is_truncated() {
        assert_eq!(
            format_prediction(&PredictionResult { value: 41.99 }),
            "Predicted Traffic: 41"
        );
    }
}
