// ABOUTME: Engine configuration with validated construction and environment overrides
// ABOUTME: Covers duration buckets, gap threshold, trend time constants, and parallelism
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Engine configuration
//!
//! All tunables live in [`EngineConfig`]. Construction is infallible; every
//! consumer goes through [`EngineConfig::validated`], which rejects
//! configurations that would make the numeric core meaningless (empty bucket
//! set, non-positive time constants). The bucket-set version participates in
//! cache stamps, so operators bump it whenever they change the analysis
//! parameters and cached derived fields must be recomputed.

use crate::errors::{AppError, AppResult};
use crate::models::curve::Objective;
use crate::models::sport::SportType;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Default duration buckets sampled on the mean-maximal curve, in seconds.
///
/// Spans 1 second to 24 hours with denser coverage at short durations where
/// the power-duration relationship changes fastest.
pub const DEFAULT_DURATION_BUCKETS: &[u32] = &[
    1, 5, 10, 15, 30, 60, 120, 180, 300, 600, 900, 1200, 1800, 2700, 3600, 5400, 7200, 10800,
    14400, 21600, 28800, 43200, 86400,
];

/// Recording gaps longer than this start a new continuous segment
const DEFAULT_GAP_THRESHOLD_SECONDS: u32 = 10;

/// Standard rolling window for Normalized Power smoothing
const DEFAULT_ROLLING_WINDOW_SECONDS: u32 = 30;

/// Series length above which the curve engine evaluates buckets in parallel
const DEFAULT_LARGE_SERIES_THRESHOLD: usize = 100_000;

/// Default lookback for aggregate (best-of-history) curves
const DEFAULT_ROLLING_CURVE_WINDOW_DAYS: u32 = 90;

/// Standard CTL (Chronic Training Load) time constant - 42 days
const DEFAULT_CTL_DAYS: f64 = 42.0;

/// Standard ATL (Acute Training Load) time constant - 7 days
const DEFAULT_ATL_DAYS: f64 = 7.0;

/// Concurrent per-activity units during backfill
const DEFAULT_BACKFILL_PARALLELISM: usize = 8;

/// Versioned set of duration buckets
///
/// The version is stored in every cache stamp. Changing the bucket list
/// without bumping the version leaves stale curves in place; bumping it
/// invalidates every cached derived field on next read or backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSet {
    /// Monotonically increased by operators when the bucket list changes
    pub version: u32,
    /// Window lengths in seconds, strictly increasing
    pub buckets: Vec<u32>,
}

impl Default for BucketSet {
    fn default() -> Self {
        Self {
            version: 1,
            buckets: DEFAULT_DURATION_BUCKETS.to_vec(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Duration buckets evaluated on every mean-maximal curve
    pub bucket_set: BucketSet,
    /// Recording gap (seconds) above which a new segment starts
    pub gap_threshold_seconds: u32,
    /// Rolling window (seconds) for Normalized Power / Normalized Graded Pace
    pub rolling_window_seconds: u32,
    /// Per-second sample count above which buckets are evaluated in parallel
    pub large_series_threshold: usize,
    /// Lookback window (days) for aggregate best-of-history curves
    pub rolling_curve_window_days: u32,
    /// CTL time constant in days
    pub ctl_time_constant_days: f64,
    /// ATL time constant in days
    pub atl_time_constant_days: f64,
    /// Sports scored against pace rather than power (lower is better)
    pub pace_sports: Vec<SportType>,
    /// Concurrent per-activity units during backfill
    pub backfill_parallelism: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bucket_set: BucketSet::default(),
            gap_threshold_seconds: DEFAULT_GAP_THRESHOLD_SECONDS,
            rolling_window_seconds: DEFAULT_ROLLING_WINDOW_SECONDS,
            large_series_threshold: DEFAULT_LARGE_SERIES_THRESHOLD,
            rolling_curve_window_days: DEFAULT_ROLLING_CURVE_WINDOW_DAYS,
            ctl_time_constant_days: DEFAULT_CTL_DAYS,
            atl_time_constant_days: DEFAULT_ATL_DAYS,
            pace_sports: vec![
                SportType::Run,
                SportType::VirtualRun,
                SportType::Walk,
                SportType::Hike,
                SportType::Swim,
            ],
            backfill_parallelism: DEFAULT_BACKFILL_PARALLELISM,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration, consuming and returning it on success
    ///
    /// # Errors
    ///
    /// Returns `AppError::config_invalid` for an empty or unsorted bucket
    /// set, a zero bucket, a zero gap threshold or rolling window,
    /// non-positive time constants, or zero backfill parallelism.
    pub fn validated(self) -> AppResult<Self> {
        if self.bucket_set.buckets.is_empty() {
            return Err(AppError::config_invalid("duration bucket set is empty"));
        }
        if self.bucket_set.buckets.contains(&0) {
            return Err(AppError::config_invalid("duration buckets must be positive"));
        }
        if !self.bucket_set.buckets.windows(2).all(|w| w[0] < w[1]) {
            return Err(AppError::config_invalid(
                "duration buckets must be strictly increasing",
            ));
        }
        if self.gap_threshold_seconds == 0 {
            return Err(AppError::config_invalid("gap threshold must be positive"));
        }
        if self.rolling_window_seconds == 0 {
            return Err(AppError::config_invalid("rolling window must be positive"));
        }
        if !(self.ctl_time_constant_days.is_finite() && self.ctl_time_constant_days > 0.0) {
            return Err(AppError::config_invalid(format!(
                "CTL time constant must be positive, got {}",
                self.ctl_time_constant_days
            )));
        }
        if !(self.atl_time_constant_days.is_finite() && self.atl_time_constant_days > 0.0) {
            return Err(AppError::config_invalid(format!(
                "ATL time constant must be positive, got {}",
                self.atl_time_constant_days
            )));
        }
        if self.rolling_curve_window_days == 0 {
            return Err(AppError::config_invalid(
                "rolling curve window must be at least one day",
            ));
        }
        if self.backfill_parallelism == 0 {
            return Err(AppError::config_invalid(
                "backfill parallelism must be at least one",
            ));
        }
        Ok(self)
    }

    /// Apply environment overrides on top of the current values
    ///
    /// Unparsable values are ignored with a warning rather than failing
    /// startup; validation still runs afterwards via [`Self::validated`].
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(value) = read_env_parsed::<u32>("ANALYTICS_GAP_THRESHOLD_SECONDS") {
            self.gap_threshold_seconds = value;
        }
        if let Some(value) = read_env_parsed::<u32>("ANALYTICS_ROLLING_WINDOW_SECONDS") {
            self.rolling_window_seconds = value;
        }
        if let Some(value) = read_env_parsed::<usize>("ANALYTICS_LARGE_SERIES_THRESHOLD") {
            self.large_series_threshold = value;
        }
        if let Some(value) = read_env_parsed::<u32>("ANALYTICS_ROLLING_CURVE_WINDOW_DAYS") {
            self.rolling_curve_window_days = value;
        }
        if let Some(value) = read_env_parsed::<f64>("ANALYTICS_CTL_DAYS") {
            self.ctl_time_constant_days = value;
        }
        if let Some(value) = read_env_parsed::<f64>("ANALYTICS_ATL_DAYS") {
            self.atl_time_constant_days = value;
        }
        if let Some(value) = read_env_parsed::<usize>("ANALYTICS_BACKFILL_PARALLELISM") {
            self.backfill_parallelism = value;
        }
        self
    }

    /// Version tag recorded in cache stamps
    ///
    /// Derived fields are recomputed when this changes, the reference
    /// threshold changes, or the sample series revision changes.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.bucket_set.version
    }

    /// Objective direction for a sport's primary metric
    #[must_use]
    pub fn objective_for(&self, sport: &SportType) -> Objective {
        if self.pace_sports.contains(sport) {
            Objective::Minimize
        } else {
            Objective::Maximize
        }
    }
}

/// Read and parse an environment variable, warning on parse failure
fn read_env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {name}={raw}");
            None
        }
    }
}
