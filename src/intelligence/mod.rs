// ABOUTME: Pure analytics algorithms for fitness data
// ABOUTME: Sample normalization, mean-maximal curves, effort scoring, and trend modeling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pure computation core
//!
//! Every function in this tree is a side-effect-free transform over in-memory
//! data. I/O (reading series, writing cached fields) happens in [`crate::engine`]
//! and [`crate::backfill`] at the boundaries of a unit of work.

/// Mean-maximal curve extraction
pub mod curve;

/// Gap-aware sample normalization
pub mod normalizer;

/// Named physiological and formula constants
pub mod physiological_constants;

/// Normalized Power, Intensity Factor, TSS, and Variability Index
pub mod scoring;

/// Fitness-fatigue (chronic/acute load) trend model
pub mod trend;

pub use curve::{CurveEngine, CurveSource};
pub use normalizer::{Channel, ChannelRun, NormalizedSeries, SampleNormalizer, Segment};
pub use scoring::{EffortScorer, EffortScores, ScoringMode};
pub use trend::TrendCalculator;
