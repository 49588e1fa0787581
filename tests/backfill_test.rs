// ABOUTME: Backfill coordinator tests: idempotence, failure isolation, cancellation
// ABOUTME: Runs full backfills against the in-memory repository

mod common;

use common::{activity, flat_power_series, recorded_at};
use pierre_analytics::backfill::{BackfillCoordinator, CancellationFlag};
use pierre_analytics::config::{BucketSet, EngineConfig};
use pierre_analytics::engine::{AthleteThresholds, PerformanceEngine};
use pierre_analytics::models::sport::SportType;
use pierre_analytics::repository::memory::InMemoryRepository;
use pierre_analytics::repository::AnalyticsRepository;
use std::sync::Arc;
use uuid::Uuid;

const FTP_250: AthleteThresholds = AthleteThresholds {
    ftp_watts: Some(250.0),
    threshold_pace_mps: None,
};

async fn seeded_repository(athlete_id: Uuid, count: usize) -> InMemoryRepository {
    let repository = InMemoryRepository::new();
    for index in 0..count {
        let ride = activity(
            athlete_id,
            SportType::Ride,
            recorded_at(2025, 3, 1 + index as u32),
            1800,
        );
        repository
            .insert_activity(ride, Some(flat_power_series(1800, 180.0 + index as f64)))
            .await;
    }
    repository
}

fn coordinator(
    repository: InMemoryRepository,
) -> (
    Arc<PerformanceEngine<InMemoryRepository>>,
    BackfillCoordinator<InMemoryRepository>,
) {
    let engine = Arc::new(PerformanceEngine::new(EngineConfig::default(), repository).unwrap());
    let coordinator = BackfillCoordinator::new(Arc::clone(&engine));
    (engine, coordinator)
}

async fn cached_fields_snapshot(
    engine: &PerformanceEngine<InMemoryRepository>,
    athlete_id: Uuid,
) -> Vec<u8> {
    let mut snapshot = Vec::new();
    for activity_id in engine
        .repository()
        .list_activity_ids(athlete_id)
        .await
        .unwrap()
    {
        let stored = engine
            .repository()
            .get_activity(activity_id)
            .await
            .unwrap()
            .unwrap();
        snapshot.extend(serde_json::to_vec(&stored.derived).unwrap());
    }
    snapshot
}

#[tokio::test]
async fn repeated_backfills_are_idempotent() {
    let athlete_id = Uuid::new_v4();
    let repository = seeded_repository(athlete_id, 6).await;
    let (engine, coordinator) = coordinator(repository);

    let first = coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();
    assert_eq!(first.computed, 6);
    assert_eq!(first.failed, 0);
    let after_first = cached_fields_snapshot(&engine, athlete_id).await;

    let second = coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();
    assert_eq!(second.skipped_fresh, 6);
    assert_eq!(second.computed, 0);
    let after_second = cached_fields_snapshot(&engine, athlete_id).await;

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn missing_series_is_counted_and_never_aborts_the_batch() {
    let athlete_id = Uuid::new_v4();
    let repository = seeded_repository(athlete_id, 3).await;
    let corrupt = activity(athlete_id, SportType::Ride, recorded_at(2025, 3, 20), 900);
    repository.insert_activity(corrupt, None).await;

    let (_, coordinator) = coordinator(repository);
    let report = coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.computed, 3);
    assert_eq!(report.missing_input, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.processed(), 4);
}

#[tokio::test]
async fn missing_input_is_stamped_and_skipped_on_resume() {
    let athlete_id = Uuid::new_v4();
    let repository = InMemoryRepository::new();
    let corrupt = activity(athlete_id, SportType::Ride, recorded_at(2025, 3, 20), 900);
    repository.insert_activity(corrupt, None).await;

    let (_, coordinator) = coordinator(repository);
    let first = coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();
    assert_eq!(first.missing_input, 1);

    // The null fields were stamped, so the rerun does not re-attempt
    let second = coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();
    assert_eq!(second.skipped_fresh, 1);
    assert_eq!(second.missing_input, 0);
}

#[tokio::test]
async fn pre_cancelled_run_commits_nothing_and_resumes_cleanly() {
    let athlete_id = Uuid::new_v4();
    let repository = seeded_repository(athlete_id, 4).await;
    let (_, coordinator) = coordinator(repository);

    let cancellation = CancellationFlag::new();
    cancellation.cancel();
    let cancelled = coordinator
        .run(athlete_id, FTP_250, &cancellation)
        .await
        .unwrap();
    assert!(cancelled.cancelled);
    assert_eq!(cancelled.processed(), 0);

    let resumed = coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();
    assert_eq!(resumed.computed, 4);
}

#[tokio::test]
async fn partial_cancellation_keeps_committed_work() {
    let athlete_id = Uuid::new_v4();
    let repository = seeded_repository(athlete_id, 8).await;
    let (engine, coordinator) = coordinator(repository);

    // Warm two activities, then pretend the rest of a previous run was cut off
    let ids = engine
        .repository()
        .list_activity_ids(athlete_id)
        .await
        .unwrap();
    for activity_id in ids.iter().take(2) {
        engine.refresh(*activity_id, &FTP_250).await.unwrap();
    }

    let report = coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();
    assert_eq!(report.skipped_fresh, 2);
    assert_eq!(report.computed, 6);
}

#[tokio::test]
async fn config_version_bump_forces_full_recompute() {
    let athlete_id = Uuid::new_v4();
    let repository = seeded_repository(athlete_id, 3).await;
    let (_, coordinator) = coordinator(repository.clone());
    coordinator
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();

    let config = EngineConfig {
        bucket_set: BucketSet {
            version: 2,
            ..BucketSet::default()
        },
        ..EngineConfig::default()
    };
    let engine = Arc::new(PerformanceEngine::new(config, repository).unwrap());
    let report = BackfillCoordinator::new(engine)
        .run(athlete_id, FTP_250, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.computed, 3);
    assert_eq!(report.skipped_fresh, 0);
}
