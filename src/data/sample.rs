//! Synthetic hourly traffic generation.
//!
//! Produces a reproducible dataset in the same shape as the real junction
//! counts, so the dashboard can be exercised without a real CSV.
//!
//! Each junction gets its own base level; counts follow a daily profile
//! (morning and evening peaks), a weekend dip, and slow growth over time,
//! with Poisson noise on top.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Normal, Poisson};

use crate::domain::TrafficRecord;
use crate::error::AppError;

/// Relative growth of the level per year of elapsed data.
const YEARLY_GROWTH: f64 = 0.35;

/// Weekend traffic relative to weekdays.
const WEEKEND_FACTOR: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub start: NaiveDate,
    pub days: u32,
    pub junctions: u32,
    pub seed: u64,
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<TrafficRecord>, AppError> {
    if config.days == 0 {
        return Err(AppError::config("Sample day count must be > 0."));
    }
    if config.junctions == 0 {
        return Err(AppError::config("Sample junction count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let level_noise = Normal::<f64>::new(0.0, 0.15)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

    // Junction 1 is the busiest; later ids are progressively quieter.
    let bases: Vec<f64> = (0..config.junctions)
        .map(|j| {
            let base = 40.0 / (1.0 + j as f64 * 0.8);
            base * (1.0 + level_noise.sample(&mut rng)).max(0.3)
        })
        .collect();

    let mut records = Vec::with_capacity(config.days as usize * 24 * config.junctions as usize);
    for d in 0..config.days {
        let date = config
            .start
            .checked_add_signed(Duration::days(i64::from(d)))
            .ok_or_else(|| AppError::config("Sample date range overflows the calendar."))?;
        let trend = 1.0 + YEARLY_GROWTH * f64::from(d) / 365.0;
        let weekday = weekday_factor(date.weekday());

        for hour in 0..24u32 {
            let timestamp = date
                .and_hms_opt(hour, 0, 0)
                .ok_or_else(|| AppError::config("Invalid sample timestamp."))?;
            let shape = hourly_profile(hour);

            for (j, base) in bases.iter().enumerate() {
                let lambda = (base * shape * weekday * trend).max(0.1);
                let poisson = Poisson::new(lambda)
                    .map_err(|e| AppError::config(format!("Count distribution error: {e}")))?;
                let vehicles = poisson.sample(&mut rng).round().max(0.0) as u64;
                records.push(TrafficRecord {
                    timestamp,
                    junction: j as i64 + 1,
                    vehicles,
                });
            }
        }
    }

    Ok(records)
}

/// Daily shape with peaks around 09:00 and 18:00 and a trough before dawn.
fn hourly_profile(hour: u32) -> f64 {
    let h = f64::from(hour);
    let peak = |center: f64, width: f64| (-((h - center) / width).powi(2)).exp();
    let base = 0.75 + 0.25 * (2.0 * PI * (h - 15.0) / 24.0).cos();
    base + 0.6 * peak(9.0, 1.5) + 0.7 * peak(18.0, 2.0)
}

fn weekday_factor(day: Weekday) -> f64 {
    match day {
        Weekday::Sat | Weekday::Sun => WEEKEND_FACTOR,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            start: NaiveDate::from_ymd_opt(2015, 11, 1).unwrap(),
            days: 3,
            junctions: 2,
            seed,
        }
    }

    #[test]
    fn generates_one_row_per_hour_and_junction() {
        let records = generate_sample(&config(7)).unwrap();
        assert_eq!(records.len(), 3 * 24 * 2);
        assert_eq!(records[0].junction, 1);
        assert_eq!(records[1].junction, 2);
    }

    #[test]
    fn same_seed_same_data() {
        assert_eq!(generate_sample(&config(7)).unwrap(), generate_sample(&config(7)).unwrap());
    }

    #[test]
    fn rush_hour_beats_small_hours() {
        assert!(hourly_profile(9) > hourly_profile(3));
        assert!(hourly_profile(18) > hourly_profile(3));
    }

    #[test]
    fn zero_days_is_rejected() {
        let cfg = SampleConfig { days: 0, ..config(1) };
        assert!(generate_sample(&cfg).is_err());
    }
}
