// ABOUTME: Bulk recomputation of derived fields across all of an athlete's activities
// ABOUTME: Bounded-parallel, cancellable, idempotent; one unit's failure never aborts the batch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Backfill coordinator
//!
//! Walks an athlete's activities and forces computation of any missing or
//! stale derived fields. Units are per-activity and independent, so they run
//! on a bounded task set. Already-fresh activities are skipped, which makes
//! repeated runs idempotent and makes a cancelled run resumable: committed
//! work stays committed, and the next run picks up the remainder.

use crate::engine::{AthleteThresholds, PerformanceEngine, RefreshOutcome};
use crate::errors::{AppError, AppResult};
use crate::repository::AnalyticsRepository;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

/// Cooperative cancellation handle for a running backfill
///
/// Cancellation is checked between units: setting the flag stops new units
/// from starting while in-flight units run to completion and commit.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Create a flag that is not yet cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// One activity that could not be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillFailure {
    /// The failing activity
    pub activity_id: Uuid,
    /// Why it failed
    pub reason: String,
}

/// Per-activity outcome counts for one backfill run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Activities whose fields were (re)computed
    pub computed: usize,
    /// Activities skipped because their cached fields were fresh
    pub skipped_fresh: usize,
    /// Activities with no usable series; null fields were written
    pub missing_input: usize,
    /// Activities that errored; their cached state is unchanged
    pub failed: usize,
    /// Whether the run stopped early on cancellation
    pub cancelled: bool,
    /// Details for every failed activity
    pub failures: Vec<BackfillFailure>,
}

impl BackfillReport {
    /// Total units that reached a terminal outcome
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.computed + self.skipped_fresh + self.missing_input + self.failed
    }
}

/// Drives bulk recomputation through the engine
pub struct BackfillCoordinator<R> {
    engine: Arc<PerformanceEngine<R>>,
}

impl<R: AnalyticsRepository + 'static> BackfillCoordinator<R> {
    /// Create a coordinator over a shared engine
    #[must_use]
    pub const fn new(engine: Arc<PerformanceEngine<R>>) -> Self {
        Self { engine }
    }

    /// Backfill every activity of one athlete
    ///
    /// Runs up to the configured parallelism of units concurrently. One
    /// unit's failure is recorded in the report and never aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns an error only when the activity listing itself fails;
    /// per-activity failures land in the report instead.
    pub async fn run(
        &self,
        athlete_id: Uuid,
        thresholds: AthleteThresholds,
        cancellation: &CancellationFlag,
    ) -> AppResult<BackfillReport> {
        let ids = self
            .engine
            .repository()
            .list_activity_ids(athlete_id)
            .await?;
        let total = ids.len();
        info!(athlete_id = %athlete_id, total, "starting backfill");

        let semaphore = Arc::new(Semaphore::new(self.engine.config().backfill_parallelism));
        let mut units = JoinSet::new();
        let mut report = BackfillReport::default();

        for activity_id in ids {
            if cancellation.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| AppError::internal("backfill semaphore closed").with_source(e))?;
            let engine = Arc::clone(&self.engine);
            units.spawn(async move {
                let _permit = permit;
                let outcome = engine.refresh(activity_id, &thresholds).await;
                (activity_id, outcome)
            });
        }

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((_, Ok(RefreshOutcome::Computed))) => report.computed += 1,
                Ok((_, Ok(RefreshOutcome::SkippedFresh))) => report.skipped_fresh += 1,
                Ok((_, Ok(RefreshOutcome::MissingInput))) => report.missing_input += 1,
                Ok((activity_id, Err(error))) => {
                    warn!(activity_id = %activity_id, %error, "backfill unit failed");
                    report.failed += 1;
                    report.failures.push(BackfillFailure {
                        activity_id,
                        reason: error.to_string(),
                    });
                }
                Err(join_error) => {
                    warn!(%join_error, "backfill unit panicked");
                    report.failed += 1;
                    report.failures.push(BackfillFailure {
                        activity_id: Uuid::nil(),
                        reason: join_error.to_string(),
                    });
                }
            }
        }

        info!(
            athlete_id = %athlete_id,
            computed = report.computed,
            skipped_fresh = report.skipped_fresh,
            missing_input = report.missing_input,
            failed = report.failed,
            cancelled = report.cancelled,
            "backfill finished"
        );
        Ok(report)
    }
}
