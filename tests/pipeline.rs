use chrono::NaiveDate;
use traffic_dash::app::pipeline::build_view;
use traffic_dash::data::{SampleConfig, TrafficDataset, generate_sample};
use traffic_dash::domain::{GroupKey, PredictionRequest};
use traffic_dash::error::ErrorKind;
use traffic_dash::io::write_dataset;
use traffic_dash::models::Predictor;

const THREE_ROWS: &str = "DateTime,ID,Junction,Vehicles\n\
                          2015-11-01 00:00:00,1,1,15\n\
                          2015-11-01 01:00:00,2,1,13\n\
                          2015-11-01 00:00:00,3,2,6\n";

const FOREST: &str = r#"{
    "format": "traffic-model",
    "version": 1,
    "n_features": 5,
    "feature_names": ["hour", "day", "month", "year", "junction"],
    "model": {
        "kind": "forest",
        "trees": [
            {"nodes": [
                {"feature": 0, "threshold": 6.5, "left": 1, "right": 2},
                {"value": 10.0},
                {"value": 40.0}
            ]},
            {"nodes": [
                {"feature": 4, "threshold": 1.5, "left": 1, "right": 2},
                {"value": 30.0},
                {"value": 20.0}
            ]}
        ]
    }
}"#;

fn request(hour: u32, junction: i64) -> PredictionRequest {
    PredictionRequest { hour, day: 15, month: 6, year: 2016, junction }
}

#[test]
fn three_row_dataset_kpis_and_groups() {
    let ds = TrafficDataset::from_reader(THREE_ROWS.as_bytes()).unwrap();
    assert_eq!(ds.total_vehicles(), 34);
    assert!((ds.mean_vehicles().unwrap() - 34.0 / 3.0).abs() < 1e-9);

    let by_junction = ds.sum_by(GroupKey::Junction);
    assert_eq!(by_junction.get(1), Some(28));
    assert_eq!(by_junction.get(2), Some(6));

    assert_eq!(ds.unique_years(), vec![2015]);
    assert_eq!(ds.unique_junctions(), vec![1, 2]);
}

#[test]
fn missing_vehicles_column_is_a_format_error() {
    let csv = "DateTime,Junction\n2015-11-01 00:00:00,1\n";
    let err = TrafficDataset::from_reader(csv.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn bad_count_is_a_parse_error() {
    let csv = "DateTime,Junction,Vehicles\n2015-11-01 00:00:00,1,many\n";
    let err = TrafficDataset::from_reader(csv.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn forest_averages_its_trees() {
    let p = Predictor::from_reader(FOREST.as_bytes()).unwrap();
    // hour 3 -> 10, junction 1 -> 30
    assert_eq!(p.predict(&request(3, 1)).unwrap().display_value(), 20);
    // hour 18 -> 40, junction 4 -> 20
    assert_eq!(p.predict(&request(18, 4)).unwrap().display_value(), 30);
    assert_eq!(p.describe(), "forest (2 trees) (5 features)");
}

#[test]
fn narrow_model_loads_but_cannot_predict() {
    let json = r#"{"format":"traffic-model","version":1,"n_features":4,
        "model":{"kind":"linear","intercept":0.0,"coefficients":[1,1,1,1]}}"#;
    let p = Predictor::from_reader(json.as_bytes()).unwrap();
    let err = p.predict(&request(10, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Prediction);
}

#[test]
fn sample_survives_csv_round_trip() {
    let config = SampleConfig {
        start: NaiveDate::from_ymd_opt(2015, 11, 1).unwrap(),
        days: 3,
        junctions: 2,
        seed: 7,
    };
    let records = generate_sample(&config).unwrap();

    let mut buf = Vec::new();
    write_dataset(&mut buf, &records).unwrap();
    let ds = TrafficDataset::from_reader(buf.as_slice()).unwrap();

    assert_eq!(ds.len(), records.len());
    let expected: u64 = records.iter().map(|r| r.vehicles).sum();
    assert_eq!(ds.total_vehicles(), expected);
    assert_eq!(ds.unique_junctions(), vec![1, 2]);
}

#[test]
fn every_grouping_sums_to_the_total() {
    let config = SampleConfig {
        start: NaiveDate::from_ymd_opt(2016, 12, 30).unwrap(),
        days: 5,
        junctions: 3,
        seed: 1,
    };
    let ds = TrafficDataset::from_records(generate_sample(&config).unwrap()).unwrap();
    let view = build_view(&ds);

    assert_eq!(view.years, vec![2016, 2017]);
    for aggregate in &view.views {
        assert_eq!(aggregate.total(), ds.total_vehicles(), "{:?}", aggregate.key);
    }
}
