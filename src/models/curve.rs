// ABOUTME: Mean-maximal curve value types shared by the curve engine and the cache layer
// ABOUTME: Duration buckets with display labels, per-activity curves, and rolling aggregates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Objective direction for best-window search
///
/// Power-style metrics maximize the window average; pace-style metrics
/// (seconds per meter, lower is better) minimize it. Passed explicitly into
/// the curve engine so the hot loop never inspects sport names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Higher window averages win (power, speed)
    Maximize,
    /// Lower window averages win (pace)
    Minimize,
}

impl Objective {
    /// Whether `candidate` beats `incumbent` under this objective
    #[must_use]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Maximize => candidate > incumbent,
            Self::Minimize => candidate < incumbent,
        }
    }
}

/// One fixed window length sampled on the mean-maximal curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationBucket(pub u32);

impl DurationBucket {
    /// Window length in seconds
    #[must_use]
    pub const fn seconds(self) -> u32 {
        self.0
    }

    /// Human-readable label used as the downstream curve key ("30s", "20m", "1h30m")
    #[must_use]
    pub fn label(self) -> String {
        let total = self.0;
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        let mut label = String::new();
        if hours > 0 {
            label.push_str(&format!("{hours}h"));
        }
        if minutes > 0 {
            label.push_str(&format!("{minutes}m"));
        }
        if seconds > 0 || label.is_empty() {
            label.push_str(&format!("{seconds}s"));
        }
        label
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Best sustained average for one bucket within one activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestEffort {
    /// Window length in seconds
    pub duration_seconds: u32,
    /// Best window average under the curve's objective
    pub value: f64,
    /// Offset from activity start where the best window begins
    pub start_offset: u32,
}

/// One curve entry: a bucket and its best effort, if any window fit
///
/// `effort` is `None` when the bucket is longer than every continuous
/// stretch of data; a null entry is never a fabricated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// The duration bucket
    pub bucket: DurationBucket,
    /// Best effort, absent when no window of this length fit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<BestEffort>,
}

/// Mean-maximal curve for one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanMaximalCurve {
    /// Objective the curve was extracted under
    pub objective: Objective,
    /// One point per configured bucket, in bucket order
    pub points: Vec<CurvePoint>,
}

impl MeanMaximalCurve {
    /// Curve keyed by duration label, the shape dashboard consumers read
    #[must_use]
    pub fn labeled(&self) -> Vec<(String, Option<f64>)> {
        self.points
            .iter()
            .map(|point| {
                (
                    point.bucket.label(),
                    point.effort.map(|effort| effort.value),
                )
            })
            .collect()
    }

    /// Best value for a bucket, if present on the curve
    #[must_use]
    pub fn value_at(&self, bucket: DurationBucket) -> Option<f64> {
        self.points
            .iter()
            .find(|point| point.bucket == bucket)
            .and_then(|point| point.effort.as_ref())
            .map(|effort| effort.value)
    }
}

/// Best-of-history entry for one bucket in a rolling window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatePoint {
    /// The duration bucket
    pub bucket: DurationBucket,
    /// Best window average among in-window activities
    pub value: f64,
    /// Activity that produced the best value (most recent on ties)
    pub activity_id: Uuid,
    /// When that activity was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Rolling best-of-history curve for one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateCurve {
    /// Objective the member curves were extracted under
    pub objective: Objective,
    /// Lookback window in days
    pub window_days: u32,
    /// End of the lookback window
    pub as_of: DateTime<Utc>,
    /// Buckets with at least one in-window effort, in bucket order
    pub points: Vec<AggregatePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_labels_compose_hours_minutes_seconds() {
        assert_eq!(DurationBucket(1).label(), "1s");
        assert_eq!(DurationBucket(30).label(), "30s");
        assert_eq!(DurationBucket(60).label(), "1m");
        assert_eq!(DurationBucket(90).label(), "1m30s");
        assert_eq!(DurationBucket(1200).label(), "20m");
        assert_eq!(DurationBucket(5400).label(), "1h30m");
        assert_eq!(DurationBucket(86400).label(), "24h");
    }

    #[test]
    fn objective_comparison_directions() {
        assert!(Objective::Maximize.is_better(210.0, 200.0));
        assert!(!Objective::Maximize.is_better(200.0, 200.0));
        assert!(Objective::Minimize.is_better(190.0, 200.0));
    }

    #[test]
    fn labeled_curve_keeps_null_buckets_distinguishable() {
        let curve = MeanMaximalCurve {
            objective: Objective::Maximize,
            points: vec![
                CurvePoint {
                    bucket: DurationBucket(60),
                    effort: Some(BestEffort {
                        duration_seconds: 60,
                        value: 310.0,
                        start_offset: 42,
                    }),
                },
                CurvePoint {
                    bucket: DurationBucket(1200),
                    effort: None,
                },
            ],
        };

        let labeled = curve.labeled();
        assert_eq!(labeled[0], ("1m".into(), Some(310.0)));
        assert_eq!(labeled[1], ("20m".into(), None));
    }
}
