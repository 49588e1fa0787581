// ABOUTME: Mean-maximal curve extraction over duration buckets via prefix-sum differencing
// ABOUTME: Sequential evaluation with a parallel per-bucket path for large series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Mean-maximal curve engine
//!
//! For every configured duration bucket W, the engine finds the best average
//! over all windows of W consecutive seconds fully contained in one dense
//! channel run. Per run a prefix-sum array is built once; each bucket's best
//! window is then a linear scan of prefix differences.
//!
//! The sequential scan over all buckets is the reference. Series longer than
//! the configured threshold evaluate buckets in parallel with rayon; both
//! paths share the same kernel per bucket, so their results are identical.

use crate::config::EngineConfig;
use crate::intelligence::normalizer::ChannelRun;
use crate::models::curve::{
    AggregateCurve, AggregatePoint, BestEffort, CurvePoint, DurationBucket, MeanMaximalCurve,
    Objective,
};
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use uuid::Uuid;

/// One activity's curve together with its identity, for rolling aggregation
#[derive(Debug, Clone, Copy)]
pub struct CurveSource<'a> {
    /// Activity that produced the curve
    pub activity_id: Uuid,
    /// When the activity was recorded
    pub recorded_at: DateTime<Utc>,
    /// The activity's mean-maximal curve
    pub curve: &'a MeanMaximalCurve,
}

/// Prefix sums for one dense channel run
struct PrefixRun {
    start_offset: u32,
    /// `prefix[i]` is the sum of the first `i` values; length is run length + 1
    prefix: Vec<f64>,
}

impl PrefixRun {
    fn build(run: &ChannelRun) -> Self {
        let mut prefix = Vec::with_capacity(run.values.len() + 1);
        let mut sum = 0.0;
        prefix.push(0.0);
        for value in &run.values {
            sum += value;
            prefix.push(sum);
        }
        Self {
            start_offset: run.start_offset,
            prefix,
        }
    }

    fn len(&self) -> usize {
        self.prefix.len() - 1
    }
}

/// Mean-maximal curve engine
pub struct CurveEngine {
    buckets: Vec<u32>,
    large_series_threshold: usize,
    rolling_window_days: u32,
}

impl CurveEngine {
    /// Build an engine from a validated configuration
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            buckets: config.bucket_set.buckets.clone(),
            large_series_threshold: config.large_series_threshold,
            rolling_window_days: config.rolling_curve_window_days,
        }
    }

    /// Extract the mean-maximal curve for one activity's channel runs
    ///
    /// A bucket longer than every run yields a null point. With no runs at
    /// all, every point is null.
    #[must_use]
    pub fn activity_curve(&self, runs: &[ChannelRun], objective: Objective) -> MeanMaximalCurve {
        let prefix_runs: Vec<PrefixRun> = runs.iter().map(PrefixRun::build).collect();
        let total_seconds: usize = prefix_runs.iter().map(PrefixRun::len).sum();

        let evaluate = |bucket: &u32| CurvePoint {
            bucket: DurationBucket(*bucket),
            effort: best_for_bucket(&prefix_runs, *bucket, objective),
        };

        // Same kernel either way; rayon only changes evaluation order
        let points = if total_seconds > self.large_series_threshold {
            self.buckets.par_iter().map(evaluate).collect()
        } else {
            self.buckets.iter().map(evaluate).collect()
        };

        MeanMaximalCurve { objective, points }
    }

    /// Best-of-history curve across activities in the rolling window
    ///
    /// An activity contributes when its recording date lies in
    /// `(as_of - window, as_of]` and its curve was extracted under the same
    /// objective. Ties on value favor the most recently recorded activity.
    #[must_use]
    pub fn rolling_curve(
        &self,
        sources: &[CurveSource<'_>],
        objective: Objective,
        as_of: DateTime<Utc>,
    ) -> AggregateCurve {
        let window_start = as_of - Duration::days(i64::from(self.rolling_window_days));
        let in_window: Vec<&CurveSource<'_>> = sources
            .iter()
            .filter(|source| {
                source.curve.objective == objective
                    && source.recorded_at > window_start
                    && source.recorded_at <= as_of
            })
            .collect();

        let mut points = Vec::new();
        for &bucket in &self.buckets {
            let bucket = DurationBucket(bucket);
            let mut best: Option<AggregatePoint> = None;
            for source in &in_window {
                let Some(value) = source.curve.value_at(bucket) else {
                    continue;
                };
                let replaces = best.as_ref().map_or(true, |incumbent| {
                    objective.is_better(value, incumbent.value)
                        || (value == incumbent.value && source.recorded_at > incumbent.recorded_at)
                });
                if replaces {
                    best = Some(AggregatePoint {
                        bucket,
                        value,
                        activity_id: source.activity_id,
                        recorded_at: source.recorded_at,
                    });
                }
            }
            if let Some(point) = best {
                points.push(point);
            }
        }

        AggregateCurve {
            objective,
            window_days: self.rolling_window_days,
            as_of,
            points,
        }
    }
}

/// Best window of `window` seconds over all runs, via prefix-sum differencing
fn best_for_bucket(
    prefix_runs: &[PrefixRun],
    window: u32,
    objective: Objective,
) -> Option<BestEffort> {
    let width = window as usize;
    let mut best: Option<BestEffort> = None;

    for run in prefix_runs {
        let len = run.len();
        if width > len {
            continue;
        }
        for start in 0..=(len - width) {
            let sum = run.prefix[start + width] - run.prefix[start];
            let average = sum / f64::from(window);
            let replaces = best
                .as_ref()
                .map_or(true, |incumbent| objective.is_better(average, incumbent.value));
            if replaces {
                best = Some(BestEffort {
                    duration_seconds: window,
                    value: average,
                    start_offset: run.start_offset + start as u32,
                });
            }
        }
    }

    best
}
