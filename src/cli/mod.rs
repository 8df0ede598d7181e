//! Command-line parsing for the traffic dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the dataset/model code.
//!
//! Paths fall back to `TRAFFIC_DATA` / `TRAFFIC_MODEL`, which may come from a
//! `.env` file loaded before parsing.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::GroupKey;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "traffic", version, about = "Smart traffic dashboard: historical junction counts and model predictions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(TuiArgs),
    /// Print KPIs and the four aggregate views, optionally exporting them.
    Summary(SummaryArgs),
    /// Predict traffic for one hour/day/month/year/junction.
    Predict(PredictArgs),
    /// Write a synthetic traffic CSV for trying the dashboard.
    Sample(SampleArgs),
}

/// Dataset location.
#[derive(Debug, Args, Clone)]
pub struct DataArg {
    /// Historical traffic CSV (`DateTime`, `Junction`, `Vehicles`).
    #[arg(short = 'd', long, env = "TRAFFIC_DATA", default_value = "traffic.csv")]
    pub data: PathBuf,
}

/// Model artifact location.
#[derive(Debug, Args, Clone)]
pub struct ModelArg {
    /// Model artifact JSON.
    #[arg(short = 'm', long, env = "TRAFFIC_MODEL", default_value = "traffic_model.json")]
    pub model: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArg,

    #[command(flatten)]
    pub model: ModelArg,

    /// Directory for the dashboard's log file.
    #[arg(long, env = "TRAFFIC_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Initial hour selection (0-23).
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=23))]
    pub hour: u32,

    /// Initial day selection (1-31).
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: u32,

    /// Initial month selection (1-12).
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub data: DataArg,

    /// Disable the ASCII charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 10)]
    pub height: usize,

    /// Only report these groupings (repeatable). Defaults to all four.
    #[arg(short = 'g', long = "group", value_enum)]
    pub groups: Vec<GroupKey>,

    /// Export the reported aggregate views to one CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl SummaryArgs {
    /// Selected groupings in dashboard order, without duplicates.
    pub fn selected_groups(&self) -> Vec<GroupKey> {
        GroupKey::ALL
            .into_iter()
            .filter(|key| self.groups.is_empty() || self.groups.contains(key))
            .collect()
    }
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArg,

    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=23))]
    pub hour: u32,

    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: u32,

    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    #[arg(long)]
    pub year: i32,

    #[arg(long)]
    pub junction: i64,

    /// Also print the prediction for every hour of that day.
    #[arg(long)]
    pub hourly: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, default_value = "traffic.csv")]
    pub out: PathBuf,

    /// First day of data (YYYY-MM-DD).
    #[arg(long, default_value = "2015-11-01")]
    pub start: NaiveDate,

    /// Number of days of hourly data.
    #[arg(long, default_value_t = 120)]
    pub days: u32,

    /// Number of junctions (ids 1..=N).
    #[arg(long, default_value_t = 4)]
    pub junctions: u32,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_rejects_out_of_range_hour() {
        let res = Cli::try_parse_from(["traffic", "predict", "--hour", "24", "--year", "2016", "--junction", "1"]);
        assert!(res.is_err());
    }

    #[test]
    fn summary_groups_default_to_all_in_dashboard_order() {
        let cli = Cli::try_parse_from(["traffic", "summary"]).unwrap();
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.selected_groups(), GroupKey::ALL.to_vec());

        let cli = Cli::try_parse_from(["traffic", "summary", "--group", "year", "-g", "junction", "-g", "year"]).unwrap();
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.selected_groups(), vec![GroupKey::Junction, GroupKey::Year]);
    }

    #[test]
    fn unknown_group_is_rejected() {
        assert!(Cli::try_parse_from(["traffic", "summary", "--group", "week"]).is_err());
    }

    #[test]
    fn tui_defaults_match_dashboard_sliders() {
        let cli = Cli::try_parse_from(["traffic", "tui", "--data", "x.csv"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        assert_eq!((args.hour, args.day, args.month), (10, 15, 6));
        assert_eq!(args.data.data, PathBuf::from("x.csv"));
    }
}
