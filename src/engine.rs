// ABOUTME: Compute-on-read, cache-on-write service wrapping the pure analytics core
// ABOUTME: Owns staleness detection via cache stamps and the per-athlete trend writer lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Performance engine service
//!
//! The single source of truth for every derived metric. Fields are computed
//! once, written onto the activity through the repository, and served from
//! cache until the stamp goes stale (configuration version bump, threshold
//! change, or series replacement). Staleness triggers a silent recompute and
//! is never surfaced to callers.

use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::intelligence::curve::{CurveEngine, CurveSource};
use crate::intelligence::normalizer::{Channel, SampleNormalizer};
use crate::intelligence::scoring::{EffortScorer, ScoringMode};
use crate::intelligence::trend::TrendCalculator;
use crate::models::activity::{Activity, CacheStamp, DerivedMetrics};
use crate::models::curve::{AggregateCurve, Objective};
use crate::models::sample::SampleSeries;
use crate::models::sport::SportType;
use crate::models::trend::{DailyLoad, SportFilter, TrendPoint};
use crate::repository::AnalyticsRepository;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Reference thresholds an athlete is scored against
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AthleteThresholds {
    /// Functional Threshold Power in watts
    pub ftp_watts: Option<f64>,
    /// Threshold pace as speed in m/s
    pub threshold_pace_mps: Option<f64>,
}

/// What a refresh of one activity's cached fields did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cached fields were fresh; nothing recomputed
    SkippedFresh,
    /// Fields were (re)computed and written back
    Computed,
    /// No usable series; null fields were written and stamped
    MissingInput,
}

/// The caching analytics service
///
/// Per-activity operations are independent and safe to run concurrently;
/// trend recomputation takes a per-athlete exclusive writer lock because the
/// recurrence is sequential and two concurrent recomputations could race.
pub struct PerformanceEngine<R> {
    config: EngineConfig,
    normalizer: SampleNormalizer,
    curves: CurveEngine,
    scorer: EffortScorer,
    trend: TrendCalculator,
    repository: R,
    trend_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl<R: AnalyticsRepository> PerformanceEngine<R> {
    /// Build an engine over a repository
    ///
    /// # Errors
    ///
    /// Returns `AppError::config_invalid` when the configuration fails
    /// validation; a bad configuration is fatal at construction, never at
    /// compute time.
    pub fn new(config: EngineConfig, repository: R) -> AppResult<Self> {
        let config = config.validated()?;
        Ok(Self {
            normalizer: SampleNormalizer::new(config.gap_threshold_seconds),
            curves: CurveEngine::new(&config),
            scorer: EffortScorer::new(&config),
            trend: TrendCalculator::new(&config),
            config,
            repository,
            trend_locks: DashMap::new(),
        })
    }

    /// The engine's validated configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The repository the engine reads from and writes to
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Derived metrics for one activity, computing and caching on first read
    ///
    /// # Errors
    ///
    /// Returns `AppError::not_found` for an unknown activity id and
    /// propagates repository failures. A missing series is not an error
    /// here: the returned metrics simply carry null fields.
    pub async fn derived_metrics(
        &self,
        activity_id: Uuid,
        thresholds: &AthleteThresholds,
    ) -> AppResult<DerivedMetrics> {
        let activity = self.load_activity(activity_id).await?;
        let threshold = self.reference_threshold(&activity.sport, thresholds);

        if let Some(derived) = &activity.derived {
            if derived
                .stamp
                .is_fresh(self.config.version(), threshold, activity.series_revision)
            {
                debug!(activity_id = %activity_id, "serving derived metrics from cache");
                return Ok(derived.clone());
            }
            debug!(activity_id = %activity_id, "cached metrics stale, recomputing");
        }

        let (metrics, _) = self.compute_and_store(&activity, threshold).await?;
        Ok(metrics)
    }

    /// Recompute one activity's cached fields if missing or stale
    ///
    /// The backfill coordinator's unit of work. Unlike
    /// [`Self::derived_metrics`] it reports what happened instead of
    /// returning the fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::not_found` for an unknown activity id and
    /// propagates repository failures.
    pub async fn refresh(
        &self,
        activity_id: Uuid,
        thresholds: &AthleteThresholds,
    ) -> AppResult<RefreshOutcome> {
        let activity = self.load_activity(activity_id).await?;
        let threshold = self.reference_threshold(&activity.sport, thresholds);

        if let Some(derived) = &activity.derived {
            if derived
                .stamp
                .is_fresh(self.config.version(), threshold, activity.series_revision)
            {
                return Ok(RefreshOutcome::SkippedFresh);
            }
        }

        let (_, outcome) = self.compute_and_store(&activity, threshold).await?;
        Ok(outcome)
    }

    /// Best-of-history curve for an athlete over the configured rolling window
    ///
    /// Ensures every in-scope activity's curve is computed (and cached)
    /// first, then aggregates. Only activities whose sport maps to
    /// `objective` contribute.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn rolling_curve(
        &self,
        athlete_id: Uuid,
        objective: Objective,
        as_of: DateTime<Utc>,
        thresholds: &AthleteThresholds,
    ) -> AppResult<AggregateCurve> {
        let ids = self.repository.list_activity_ids(athlete_id).await?;

        let mut curves = Vec::new();
        for activity_id in ids {
            let Some(activity) = self.repository.get_activity(activity_id).await? else {
                continue;
            };
            if self.config.objective_for(&activity.sport) != objective {
                continue;
            }
            let metrics = self.derived_metrics(activity_id, thresholds).await?;
            if let Some(curve) = metrics.mean_maximal {
                curves.push((activity_id, activity.recorded_at, curve));
            }
        }

        let sources: Vec<CurveSource<'_>> = curves
            .iter()
            .map(|(activity_id, recorded_at, curve)| CurveSource {
                activity_id: *activity_id,
                recorded_at: *recorded_at,
                curve,
            })
            .collect();

        Ok(self.curves.rolling_curve(&sources, objective, as_of))
    }

    /// Recompute and store an athlete's full trend series
    ///
    /// Serialized per athlete: two concurrent recomputations for the same
    /// athlete take turns rather than racing on `put_trend`.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn update_trend(
        &self,
        athlete_id: Uuid,
        filter: &SportFilter,
        range: RangeInclusive<NaiveDate>,
    ) -> AppResult<Vec<TrendPoint>> {
        let lock = self.trend_lock(athlete_id);
        let _guard = lock.lock().await;

        let entries = self.repository.get_daily_loads(athlete_id, range).await?;
        let loads = TrendCalculator::aggregate_daily(&entries, filter);
        let trend = self.trend.calculate(&loads);
        self.repository.put_trend(athlete_id, &trend).await?;
        debug!(athlete_id = %athlete_id, days = trend.len(), "stored recomputed trend");
        Ok(trend)
    }

    /// Advance an athlete's stored trend by one day
    ///
    /// # Errors
    ///
    /// Returns `AppError::invalid_input` when the stored trend is empty or
    /// does not end on the day before `date`; those cases need
    /// [`Self::update_trend`], the recurrence cannot skip days.
    pub async fn append_trend_day(
        &self,
        athlete_id: Uuid,
        filter: &SportFilter,
        date: NaiveDate,
    ) -> AppResult<TrendPoint> {
        let lock = self.trend_lock(athlete_id);
        let _guard = lock.lock().await;

        let mut stored = self.repository.get_trend(athlete_id).await?;
        let previous = stored.last().ok_or_else(|| {
            AppError::invalid_input("no stored trend to append to; run a full recompute")
        })?;

        let entries = self.repository.get_daily_loads(athlete_id, date..=date).await?;
        let loads = TrendCalculator::aggregate_daily(&entries, filter);
        let tss = loads
            .iter()
            .find(|load| load.date == date)
            .map_or(0.0, |load| load.tss);

        let next = self
            .trend
            .append_day(previous, DailyLoad { date, tss })?;
        stored.push(next);
        self.repository.put_trend(athlete_id, &stored).await?;
        Ok(next)
    }

    /// An athlete's stored trend series
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn trend(&self, athlete_id: Uuid) -> AppResult<Vec<TrendPoint>> {
        self.repository.get_trend(athlete_id).await
    }

    /// The reference threshold for a sport, given the athlete's thresholds
    #[must_use]
    pub fn reference_threshold(
        &self,
        sport: &SportType,
        thresholds: &AthleteThresholds,
    ) -> Option<f64> {
        match self.config.objective_for(sport) {
            Objective::Maximize => thresholds.ftp_watts,
            Objective::Minimize => thresholds.threshold_pace_mps,
        }
    }

    async fn load_activity(&self, activity_id: Uuid) -> AppResult<Activity> {
        self.repository
            .get_activity(activity_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("activity {activity_id}")))
    }

    /// Compute derived fields for an activity and write them back
    ///
    /// All I/O sits at the edges: one series read before, one metrics write
    /// after, nothing in between.
    async fn compute_and_store(
        &self,
        activity: &Activity,
        threshold: Option<f64>,
    ) -> AppResult<(DerivedMetrics, RefreshOutcome)> {
        let stamp = CacheStamp::new(
            self.config.version(),
            threshold,
            activity.series_revision,
        );

        let series = self.repository.get_series(activity.id).await?;
        let (metrics, outcome) = match series {
            Some(series) if !series.is_empty() => {
                (self.compute_metrics(activity, &series, threshold, stamp), RefreshOutcome::Computed)
            }
            _ => {
                warn!(activity_id = %activity.id, "no sample series; writing null derived fields");
                (
                    DerivedMetrics {
                        stamp,
                        ..DerivedMetrics::default()
                    },
                    RefreshOutcome::MissingInput,
                )
            }
        };

        self.repository
            .put_derived_metrics(activity.id, &metrics)
            .await?;
        Ok((metrics, outcome))
    }

    /// Pure computation for one activity: normalize, curve, score
    fn compute_metrics(
        &self,
        activity: &Activity,
        series: &SampleSeries,
        threshold: Option<f64>,
        stamp: CacheStamp,
    ) -> DerivedMetrics {
        let normalized = self.normalizer.normalize(series);
        let objective = self.config.objective_for(&activity.sport);

        let (runs, mode) = match objective {
            Objective::Maximize => (
                normalized.channel_runs(Channel::Power),
                ScoringMode::Power {
                    threshold_watts: threshold,
                },
            ),
            Objective::Minimize => (
                normalized.pace_runs(),
                ScoringMode::Pace {
                    threshold_mps: threshold,
                },
            ),
        };

        let curve = self.curves.activity_curve(&runs, objective);
        let scores = self
            .scorer
            .score(&normalized, mode, activity.duration_seconds);

        DerivedMetrics {
            avg_power: scores.avg_power,
            max_power: scores.max_power,
            normalized_power: scores.normalized_power,
            intensity_factor: scores.intensity_factor,
            training_stress_score: scores.training_stress_score,
            variability_index: scores.variability_index,
            mean_maximal: Some(curve),
            stamp,
        }
    }

    fn trend_lock(&self, athlete_id: Uuid) -> Arc<Mutex<()>> {
        self.trend_locks
            .entry(athlete_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
