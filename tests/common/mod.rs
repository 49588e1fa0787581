// ABOUTME: Shared fixtures for integration tests
// ABOUTME: Synthetic activities and sample series with controllable shape

// Not every test crate uses every fixture
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pierre_analytics::models::activity::Activity;
use pierre_analytics::models::sample::{Sample, SampleSeries};
use pierre_analytics::models::sport::SportType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Deterministic RNG so test failures reproduce
#[must_use]
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[must_use]
pub fn recorded_at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

#[must_use]
pub fn activity(
    athlete_id: Uuid,
    sport: SportType,
    recorded: DateTime<Utc>,
    duration_seconds: u64,
) -> Activity {
    Activity {
        id: Uuid::new_v4(),
        athlete_id,
        sport,
        recorded_at: recorded,
        duration_seconds,
        series_revision: 1,
        derived: None,
    }
}

/// Constant-power recording sampled every second
#[must_use]
pub fn flat_power_series(seconds: u32, watts: f64) -> SampleSeries {
    SampleSeries::new(
        (0..seconds)
            .map(|offset_seconds| Sample {
                offset_seconds,
                power: Some(watts),
                ..Sample::default()
            })
            .collect(),
    )
}

/// Noisy power recording sampled every second
#[must_use]
pub fn random_power_series(seconds: u32, seed: u64) -> SampleSeries {
    let mut rng = rng(seed);
    SampleSeries::new(
        (0..seconds)
            .map(|offset_seconds| Sample {
                offset_seconds,
                power: Some(rng.gen_range(80.0..420.0)),
                ..Sample::default()
            })
            .collect(),
    )
}

/// Steady-speed run recording
#[must_use]
pub fn flat_speed_series(seconds: u32, speed_mps: f64) -> SampleSeries {
    SampleSeries::new(
        (0..seconds)
            .map(|offset_seconds| Sample {
                offset_seconds,
                speed_mps: Some(speed_mps),
                ..Sample::default()
            })
            .collect(),
    )
}
