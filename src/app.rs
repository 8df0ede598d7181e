//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - loads the dataset and/or model
//! - prints reports or hands off to the dashboard

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Command, PredictArgs, SampleArgs, SummaryArgs, TuiArgs};
use crate::data::{SampleConfig, TrafficDataset, generate_sample};
use crate::domain::{DashboardConfig, PredictionRequest};
use crate::error::AppError;
use crate::models::Predictor;

pub mod pipeline;

/// Entry point for the `traffic` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `traffic` and `traffic --data x.csv` to behave like `traffic tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Summary(args) => {
            crate::logging::init_stderr()?;
            handle_summary(args)
        }
        Command::Predict(args) => {
            crate::logging::init_stderr()?;
            handle_predict(args)
        }
        Command::Sample(args) => {
            crate::logging::init_stderr()?;
            handle_sample(args)
        }
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let _log_guard = crate::logging::init_file(&args.log_dir)?;
    let config = dashboard_config_from_args(&args);

    // Load before touching the terminal so load errors print normally.
    let ctx = pipeline::load_context(&config)?;
    pipeline::log_context(&ctx);

    crate::tui::run(&ctx, &config)
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let dataset = TrafficDataset::load(&args.data.data)?;
    let mut view = pipeline::build_view(&dataset);
    let groups = args.selected_groups();
    view.views.retain(|v| groups.contains(&v.key));

    println!("{}", crate::report::format_run_summary(&view.summary, None));
    for aggregate in &view.views {
        println!("{}", crate::report::format_aggregate_table(aggregate));
        if !args.no_plot {
            println!("{}", crate::plot::render_ascii_chart(aggregate, args.width, args.height));
        }
    }

    if let Some(path) = &args.export {
        crate::io::export::write_aggregates_csv(path, &view.views)?;
        info!(path = %path.display(), "exported aggregates");
    }
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let predictor = Predictor::load(&args.model.model)?;
    let request = PredictionRequest {
        hour: args.hour,
        day: args.day,
        month: args.month,
        year: args.year,
        junction: args.junction,
    };

    let result = predictor.predict(&request).inspect_err(|e| {
        warn!(error = %e, "prediction failed");
    })?;
    println!("{}", crate::report::format_request(&request));
    println!("{}", crate::report::format_prediction(&result));

    if args.hourly {
        for (hour, value) in predictor.predict_hourly_profile(&request)? {
            println!("{hour:>2}:00 {value:>10.2}");
        }
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        start: args.start,
        days: args.days,
        junctions: args.junctions,
        seed: args.seed,
    };
    let records = generate_sample(&config)?;
    crate::io::export::write_dataset_csv(&args.out, &records)?;
    info!(path = %args.out.display(), records = records.len(), "wrote synthetic traffic CSV");
    Ok(())
}

pub fn dashboard_config_from_args(args: &TuiArgs) -> DashboardConfig {
    DashboardConfig {
        data_path: args.data.data.clone(),
        model_path: args.model.model.clone(),
        initial: PredictionRequest {
            hour: args.hour,
            day: args.day,
            month: args.month,
            // Replaced by the dataset's first year/junction once loaded.
            year: 0,
            junction: 0,
        },
    }
}

/// Rewrite argv so `traffic` defaults to `traffic tui`.
///
/// Rules:
/// - `traffic`                       -> `traffic tui`
/// - `traffic --data x.csv ...`      -> `traffic tui --data x.csv ...`
/// - `traffic --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "summary" | "predict" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
