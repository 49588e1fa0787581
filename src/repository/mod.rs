// ABOUTME: Storage abstraction consumed by the analytics engine
// ABOUTME: The engine owns no storage; every read and write goes through this trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Repository boundary
//!
//! All persistent state lives behind [`AnalyticsRepository`]. The engine
//! performs I/O only at the boundaries of a unit of work: read an activity
//! and its series, compute, write the derived fields back. Backends plug in
//! by implementing this trait; [`memory::InMemoryRepository`] is the bundled
//! reference implementation used by tests and embedders without a database.

/// In-memory repository implementation
pub mod memory;

use crate::errors::AppResult;
use crate::models::activity::{Activity, DerivedMetrics};
use crate::models::sample::SampleSeries;
use crate::models::trend::{DailyLoadEntry, TrendPoint};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Core storage abstraction trait
///
/// All backends must implement this trait to provide a consistent interface
/// for the engine and the backfill coordinator.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Get an activity by id
    async fn get_activity(&self, activity_id: Uuid) -> AppResult<Option<Activity>>;

    /// Get an activity's immutable sample series
    async fn get_series(&self, activity_id: Uuid) -> AppResult<Option<SampleSeries>>;

    /// Write derived fields back onto an activity
    async fn put_derived_metrics(
        &self,
        activity_id: Uuid,
        metrics: &DerivedMetrics,
    ) -> AppResult<()>;

    /// List all activity ids belonging to an athlete
    async fn list_activity_ids(&self, athlete_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Per-activity daily load entries for an athlete within a date range
    ///
    /// Entries carry the sport tag so the trend model can aggregate across
    /// sports or filter to one; activities whose TSS is absent contribute
    /// nothing.
    async fn get_daily_loads(
        &self,
        athlete_id: Uuid,
        range: RangeInclusive<NaiveDate>,
    ) -> AppResult<Vec<DailyLoadEntry>>;

    /// Replace an athlete's stored trend series
    async fn put_trend(&self, athlete_id: Uuid, series: &[TrendPoint]) -> AppResult<()>;

    /// Read an athlete's stored trend series
    async fn get_trend(&self, athlete_id: Uuid) -> AppResult<Vec<TrendPoint>>;
}
