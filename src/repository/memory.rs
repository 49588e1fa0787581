// ABOUTME: In-memory repository backing tests and database-free embedders
// ABOUTME: Shared-state implementation of AnalyticsRepository over tokio RwLock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::AnalyticsRepository;
use crate::errors::{AppError, AppResult};
use crate::models::activity::{Activity, DerivedMetrics};
use crate::models::sample::SampleSeries;
use crate::models::trend::{DailyLoadEntry, TrendPoint};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    activities: HashMap<Uuid, Activity>,
    series: HashMap<Uuid, SampleSeries>,
    trends: HashMap<Uuid, Vec<TrendPoint>>,
}

/// In-memory repository
///
/// Daily loads are derived from the stored activities' cached TSS rather
/// than kept as a separate table, so there is a single source of truth for
/// training load. Activities without a computed TSS contribute nothing
/// until a backfill fills them in.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an activity and its sample series
    pub async fn insert_activity(&self, activity: Activity, series: Option<SampleSeries>) {
        let mut store = self.store.write().await;
        if let Some(series) = series {
            store.series.insert(activity.id, series);
        }
        store.activities.insert(activity.id, activity);
    }

    /// Replace an activity's series and bump its revision, as ingestion does
    pub async fn replace_series(&self, activity_id: Uuid, series: SampleSeries) -> AppResult<()> {
        let mut store = self.store.write().await;
        let activity = store
            .activities
            .get_mut(&activity_id)
            .ok_or_else(|| AppError::not_found(format!("activity {activity_id}")))?;
        activity.series_revision += 1;
        drop(store.series.insert(activity_id, series));
        Ok(())
    }
}

#[async_trait]
impl AnalyticsRepository for InMemoryRepository {
    async fn get_activity(&self, activity_id: Uuid) -> AppResult<Option<Activity>> {
        Ok(self.store.read().await.activities.get(&activity_id).cloned())
    }

    async fn get_series(&self, activity_id: Uuid) -> AppResult<Option<SampleSeries>> {
        Ok(self.store.read().await.series.get(&activity_id).cloned())
    }

    async fn put_derived_metrics(
        &self,
        activity_id: Uuid,
        metrics: &DerivedMetrics,
    ) -> AppResult<()> {
        let mut store = self.store.write().await;
        let activity = store
            .activities
            .get_mut(&activity_id)
            .ok_or_else(|| AppError::not_found(format!("activity {activity_id}")))?;
        activity.derived = Some(metrics.clone());
        Ok(())
    }

    async fn list_activity_ids(&self, athlete_id: Uuid) -> AppResult<Vec<Uuid>> {
        let store = self.store.read().await;
        let mut ids: Vec<Uuid> = store
            .activities
            .values()
            .filter(|activity| activity.athlete_id == athlete_id)
            .map(|activity| activity.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn get_daily_loads(
        &self,
        athlete_id: Uuid,
        range: RangeInclusive<NaiveDate>,
    ) -> AppResult<Vec<DailyLoadEntry>> {
        let store = self.store.read().await;
        let mut entries: Vec<DailyLoadEntry> = store
            .activities
            .values()
            .filter(|activity| activity.athlete_id == athlete_id)
            .filter_map(|activity| {
                let tss = activity
                    .derived
                    .as_ref()
                    .and_then(|derived| derived.training_stress_score)?;
                let date = activity.recorded_at.date_naive();
                range.contains(&date).then(|| DailyLoadEntry {
                    date,
                    sport: activity.sport.clone(),
                    tss,
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }

    async fn put_trend(&self, athlete_id: Uuid, series: &[TrendPoint]) -> AppResult<()> {
        self.store
            .write()
            .await
            .trends
            .insert(athlete_id, series.to_vec());
        Ok(())
    }

    async fn get_trend(&self, athlete_id: Uuid) -> AppResult<Vec<TrendPoint>> {
        Ok(self
            .store
            .read()
            .await
            .trends
            .get(&athlete_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sport::SportType;
    use chrono::{TimeZone, Utc};

    fn activity(athlete_id: Uuid) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            athlete_id,
            sport: SportType::Ride,
            recorded_at: Utc.with_ymd_and_hms(2025, 4, 10, 8, 0, 0).unwrap(),
            duration_seconds: 3600,
            series_revision: 1,
            derived: None,
        }
    }

    #[tokio::test]
    async fn daily_loads_come_from_cached_tss_only() {
        let repository = InMemoryRepository::new();
        let athlete_id = Uuid::new_v4();

        let without_tss = activity(athlete_id);
        let mut with_tss = activity(athlete_id);
        with_tss.derived = Some(DerivedMetrics {
            training_stress_score: Some(85.0),
            ..DerivedMetrics::default()
        });
        repository.insert_activity(without_tss, None).await;
        repository.insert_activity(with_tss, None).await;

        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        let entries = repository
            .get_daily_loads(athlete_id, start..=end)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!((entries[0].tss - 85.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn replace_series_bumps_revision() {
        let repository = InMemoryRepository::new();
        let athlete_id = Uuid::new_v4();
        let stored = activity(athlete_id);
        let id = stored.id;
        repository
            .insert_activity(stored, Some(SampleSeries::default()))
            .await;

        repository
            .replace_series(id, SampleSeries::default())
            .await
            .unwrap();
        let activity = repository.get_activity(id).await.unwrap().unwrap();
        assert_eq!(activity.series_revision, 2);
    }
}
