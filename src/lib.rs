// ABOUTME: Main library entry point for the Pierre fitness analytics engine
// ABOUTME: Exposes sample normalization, mean-maximal curves, effort scoring, and trend modeling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Analytics Engine
//!
//! The numerical analytics engine behind the Pierre fitness platform. It turns
//! irregular, gap-ridden workout recordings into comparable performance
//! signals: best sustained efforts across many durations, single-activity
//! effort scores, and a longitudinal fitness/fatigue trend.
//!
//! ## Architecture
//!
//! The engine is a pure computation core wrapped in a thin caching service:
//! - **Normalizer**: segments irregular samples on recording gaps and
//!   resamples each segment onto a one-second grid
//! - **Curve engine**: mean-maximal (best sustained average) values for a
//!   fixed set of duration buckets, per activity and across a rolling window
//! - **Scoring**: Normalized Power, Intensity Factor, Training Stress Score,
//!   and Variability Index, with a grade-adjusted pace path for run-type
//!   sports
//! - **Trend model**: the chronic/acute training-load recurrence (CTL, ATL,
//!   TSB) over an athlete's full, gap-filled daily history
//! - **Cache & backfill**: compute-on-read, cache-on-write persistence of
//!   derived fields through an abstract repository, plus a parallel bulk
//!   backfill coordinator
//!
//! All storage access goes through [`repository::AnalyticsRepository`]; the
//! engine owns no storage of its own.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pierre_analytics::config::EngineConfig;
//! use pierre_analytics::engine::PerformanceEngine;
//! use pierre_analytics::repository::memory::InMemoryRepository;
//! use pierre_analytics::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = EngineConfig::default().with_env_overrides();
//!     let repository = InMemoryRepository::new();
//!     let engine = PerformanceEngine::new(config, repository)?;
//!     let _ = engine;
//!     Ok(())
//! }
//! ```

/// Bulk recomputation of derived fields across an athlete's activities
pub mod backfill;

/// Engine configuration and duration-bucket sets
pub mod config;

/// Compute-on-read caching service around the analytics core
pub mod engine;

/// Unified error handling system with standard error codes
pub mod errors;

/// Pure analytics algorithms: normalization, curves, scoring, trends
pub mod intelligence;

/// Logging configuration and structured logging setup
pub mod logging;

/// Common data structures for activities, samples, curves, and trends
pub mod models;

/// Storage abstraction consumed by the engine
pub mod repository;
