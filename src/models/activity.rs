// ABOUTME: Activity identity plus the derived metric fields the engine writes back
// ABOUTME: Includes the cache stamp that drives staleness detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::curve::MeanMaximalCurve;
use super::sport::SportType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version stamp stored alongside cached derived fields
///
/// A cached result is fresh only when all three components match the current
/// state: the engine configuration version, the reference threshold the
/// scores were computed against, and the sample series revision. Threshold
/// equality is bitwise so a stamp never drifts through float formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStamp {
    /// Engine configuration (bucket-set) version at compute time
    pub config_version: u32,
    /// Bit pattern of the reference threshold, absent when none was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_bits: Option<u64>,
    /// Sample series revision at compute time
    pub series_revision: u64,
}

impl Default for CacheStamp {
    fn default() -> Self {
        Self {
            config_version: 0,
            threshold_bits: None,
            series_revision: 0,
        }
    }
}

impl CacheStamp {
    /// Build a stamp for the given inputs
    #[must_use]
    pub fn new(config_version: u32, threshold: Option<f64>, series_revision: u64) -> Self {
        Self {
            config_version,
            threshold_bits: threshold.map(f64::to_bits),
            series_revision,
        }
    }

    /// Whether a cached result computed under this stamp is still valid
    #[must_use]
    pub fn is_fresh(&self, config_version: u32, threshold: Option<f64>, series_revision: u64) -> bool {
        *self == Self::new(config_version, threshold, series_revision)
    }
}

/// Derived metric fields computed by the engine and cached on the activity
///
/// Every field is optional: a field that failed to compute is an explicit
/// `None`, distinguishable from a legitimate zero. For pace sports the
/// normalized/intensity fields are pace-based (Normalized Graded Pace in
/// m/s against the threshold pace).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Average power in watts over seconds with power data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_power: Option<f64>,
    /// Maximum one-second power in watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_power: Option<f64>,
    /// Normalized Power (watts) or Normalized Graded Pace (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_power: Option<f64>,
    /// Intensity Factor relative to the reference threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_factor: Option<f64>,
    /// Training Stress Score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_stress_score: Option<f64>,
    /// Variability Index (NP / average power)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variability_index: Option<f64>,
    /// Mean-maximal curve over the sport's primary metric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_maximal: Option<MeanMaximalCurve>,
    /// Stamp recording the inputs these fields were computed under
    pub stamp: CacheStamp,
}

/// A deduplicated fitness activity
///
/// Identity fields are immutable once ingested; `derived` is the engine's
/// write-back slot and `series_revision` is bumped by ingestion whenever the
/// sample series is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity id
    pub id: Uuid,
    /// Owning athlete
    pub athlete_id: Uuid,
    /// Sport classification
    pub sport: SportType,
    /// When the recording started (UTC)
    pub recorded_at: DateTime<Utc>,
    /// Elapsed duration in seconds
    pub duration_seconds: u64,
    /// Revision counter for the sample series
    pub series_revision: u64,
    /// Cached derived fields, absent until first computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedMetrics>,
}
