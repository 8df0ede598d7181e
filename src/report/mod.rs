//! Reporting utilities for the text front-end.

pub mod format;

pub use format::*;
