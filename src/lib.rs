//! `traffic-dash` library crate.
//!
//! The binary (`traffic`) is a thin wrapper around this library so that:
//!
//! - dataset aggregation and prediction are testable without a terminal
//! - the text reports and the dashboard share one pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
