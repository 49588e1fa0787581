// ABOUTME: Property tests for the mean-maximal curve engine
// ABOUTME: Path equivalence against brute force, monotonicity, and gap handling

mod common;

use common::{flat_power_series, random_power_series};
use pierre_analytics::config::{BucketSet, EngineConfig};
use pierre_analytics::intelligence::curve::CurveEngine;
use pierre_analytics::intelligence::normalizer::{Channel, ChannelRun, SampleNormalizer};
use pierre_analytics::models::curve::{DurationBucket, Objective};
use pierre_analytics::models::sample::{Sample, SampleSeries};
use rand::Rng;

const TOLERANCE: f64 = 1e-9;

fn engine_with(buckets: &[u32], large_series_threshold: usize) -> CurveEngine {
    let config = EngineConfig {
        bucket_set: BucketSet {
            version: 1,
            buckets: buckets.to_vec(),
        },
        large_series_threshold,
        ..EngineConfig::default()
    };
    CurveEngine::new(&config)
}

fn power_runs(series: &SampleSeries) -> Vec<ChannelRun> {
    SampleNormalizer::new(10)
        .normalize(series)
        .channel_runs(Channel::Power)
}

/// Reference scan: windowed mean with repeated summation, no prefix sums
fn brute_force_best(runs: &[ChannelRun], window: usize, objective: Objective) -> Option<f64> {
    let mut best: Option<f64> = None;
    for run in runs {
        if run.values.len() < window {
            continue;
        }
        for start in 0..=(run.values.len() - window) {
            let mean: f64 =
                run.values[start..start + window].iter().sum::<f64>() / window as f64;
            best = match best {
                Some(current) if !objective.is_better(mean, current) => Some(current),
                _ => Some(mean),
            };
        }
    }
    best
}

#[test]
fn parallel_and_sequential_paths_match_brute_force() {
    let buckets = [1, 5, 10, 30, 60, 120, 300, 600];
    let series = random_power_series(2400, 7);
    let runs = power_runs(&series);

    let sequential = engine_with(&buckets, usize::MAX).activity_curve(&runs, Objective::Maximize);
    let parallel = engine_with(&buckets, 0).activity_curve(&runs, Objective::Maximize);

    assert_eq!(sequential, parallel);

    for point in &sequential.points {
        let expected = brute_force_best(
            &runs,
            point.bucket.seconds() as usize,
            Objective::Maximize,
        );
        match (point.effort, expected) {
            (Some(effort), Some(expected)) => {
                assert!(
                    (effort.value - expected).abs() < TOLERANCE,
                    "bucket {} diverged: {} vs {expected}",
                    point.bucket,
                    effort.value
                );
            }
            (None, None) => {}
            (actual, expected) => {
                panic!("bucket {} presence mismatch: {actual:?} vs {expected:?}", point.bucket);
            }
        }
    }
}

#[test]
fn mean_maximal_power_is_non_increasing_in_duration() {
    let series = random_power_series(3600, 21);
    let runs = power_runs(&series);
    let curve = engine_with(&[1, 5, 10, 30, 60, 300, 900, 1800, 3600], usize::MAX)
        .activity_curve(&runs, Objective::Maximize);

    let values: Vec<f64> = curve
        .points
        .iter()
        .filter_map(|point| point.effort.map(|effort| effort.value))
        .collect();
    for pair in values.windows(2) {
        assert!(
            pair[1] <= pair[0] + TOLERANCE,
            "power curve rose with duration: {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn mean_maximal_pace_is_non_decreasing_in_duration() {
    let mut rng = common::rng(33);
    let samples = (0..3600u32)
        .map(|offset_seconds| Sample {
            offset_seconds,
            speed_mps: Some(rng.gen_range(2.0..6.0)),
            ..Sample::default()
        })
        .collect();
    let series = SampleSeries::new(samples);
    let runs = SampleNormalizer::new(10).normalize(&series).pace_runs();

    let curve = engine_with(&[1, 5, 10, 30, 60, 300, 900, 1800, 3600], usize::MAX)
        .activity_curve(&runs, Objective::Minimize);

    let values: Vec<f64> = curve
        .points
        .iter()
        .filter_map(|point| point.effort.map(|effort| effort.value))
        .collect();
    assert!(!values.is_empty());
    for pair in values.windows(2) {
        assert!(
            pair[1] >= pair[0] - TOLERANCE,
            "pace curve improved with duration: {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn eleven_minute_gap_is_never_spanned() {
    // Two 5-minute blocks separated by 11 minutes of silence
    let mut samples: Vec<Sample> = (0..300u32)
        .map(|offset_seconds| Sample {
            offset_seconds,
            power: Some(250.0),
            ..Sample::default()
        })
        .collect();
    samples.extend((0..300u32).map(|index| Sample {
        offset_seconds: 300 + 660 + index,
        power: Some(250.0),
        ..Sample::default()
    }));
    let runs = power_runs(&SampleSeries::new(samples));

    let curve = engine_with(&[60, 300, 600], usize::MAX).activity_curve(&runs, Objective::Maximize);

    // 10 minutes of riding exist in total, but never contiguously
    assert_eq!(curve.value_at(DurationBucket(300)), Some(250.0));
    assert_eq!(curve.value_at(DurationBucket(600)), None);

    for point in curve.points.iter().filter_map(|point| point.effort) {
        let end = point.start_offset + point.duration_seconds;
        assert!(
            end <= 300 || point.start_offset >= 960,
            "window [{}, {end}) spans the gap",
            point.start_offset
        );
    }
}

#[test]
fn flat_hour_is_flat_up_to_duration_and_null_beyond() {
    let series = flat_power_series(3600, 200.0);
    let runs = power_runs(&series);
    let buckets = [1, 5, 30, 60, 300, 1200, 3600, 5400, 7200];
    let curve = engine_with(&buckets, usize::MAX).activity_curve(&runs, Objective::Maximize);

    for point in &curve.points {
        if point.bucket.seconds() <= 3600 {
            let effort = point.effort.expect("bucket within duration must be present");
            assert!((effort.value - 200.0).abs() < TOLERANCE);
        } else {
            assert!(point.effort.is_none(), "bucket {} beyond duration", point.bucket);
        }
    }
}

#[test]
fn single_sample_fills_only_the_one_second_bucket() {
    let series = SampleSeries::new(vec![Sample {
        offset_seconds: 0,
        power: Some(300.0),
        ..Sample::default()
    }]);
    let runs = power_runs(&series);
    let curve = engine_with(&[1, 5, 60], usize::MAX).activity_curve(&runs, Objective::Maximize);

    assert_eq!(curve.value_at(DurationBucket(1)), Some(300.0));
    assert_eq!(curve.value_at(DurationBucket(5)), None);
    assert_eq!(curve.value_at(DurationBucket(60)), None);
}
