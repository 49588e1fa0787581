// ABOUTME: Integration tests for the fitness-fatigue trend model
// ABOUTME: Closed-form recurrence check, TSB convention, and aggregation modes

mod common;

use chrono::NaiveDate;
use pierre_analytics::config::EngineConfig;
use pierre_analytics::intelligence::trend::TrendCalculator;
use pierre_analytics::models::sport::SportType;
use pierre_analytics::models::trend::{DailyLoad, DailyLoadEntry, SportFilter};
use rand::Rng;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
}

#[test]
fn week_of_loads_matches_closed_form_recurrence() {
    // Days 1-7: [100, 0, 0, 0, 0, 0, 100] with tau_ctl=42, tau_atl=7.
    //
    // The recurrence load[i] = load[i-1] + (tss[i] - load[i-1]) / tau expands
    // to the closed form load[n] = sum_i tss[i] * (1/tau) * (1 - 1/tau)^(n-i).
    let loads: Vec<DailyLoad> = (1..=7)
        .map(|day| DailyLoad {
            date: date(day),
            tss: if day == 1 || day == 7 { 100.0 } else { 0.0 },
        })
        .collect();

    let trend = TrendCalculator::new(&EngineConfig::default()).calculate(&loads);
    assert_eq!(trend.len(), 7);

    let closed_form = |tau: f64| {
        let alpha = 1.0 / tau;
        let decay = 1.0 - alpha;
        100.0 * alpha * decay.powi(6) + 100.0 * alpha
    };

    let last = trend.last().unwrap();
    assert!((last.ctl - closed_form(42.0)).abs() < 1e-12);
    assert!((last.atl - closed_form(7.0)).abs() < 1e-12);

    // Day 7's form reflects the six quiet days before it
    let day6 = trend[5];
    assert!((last.tsb - (day6.ctl - day6.atl)).abs() < 1e-12);
}

#[test]
fn tsb_equals_prior_day_ctl_minus_atl_for_all_days() {
    let mut rng = common::rng(11);
    let loads: Vec<DailyLoad> = (1..=28)
        .map(|day| DailyLoad {
            date: date(day),
            tss: if rng.gen_bool(0.3) {
                0.0
            } else {
                rng.gen_range(20.0..180.0)
            },
        })
        .collect();

    let trend = TrendCalculator::new(&EngineConfig::default()).calculate(&loads);

    assert_eq!(trend[0].tsb, 0.0);
    for pair in trend.windows(2) {
        assert_eq!(pair[1].tsb, pair[0].ctl - pair[0].atl);
    }
}

#[test]
fn combined_mode_sums_same_date_sports_before_the_recurrence() {
    let entries = vec![
        DailyLoadEntry {
            date: date(3),
            sport: SportType::Ride,
            tss: 50.0,
        },
        DailyLoadEntry {
            date: date(3),
            sport: SportType::Run,
            tss: 70.0,
        },
    ];

    let combined = TrendCalculator::aggregate_daily(&entries, &SportFilter::Combined);
    assert_eq!(combined.len(), 1);
    assert!((combined[0].tss - 120.0).abs() < f64::EPSILON);

    let rides_only =
        TrendCalculator::aggregate_daily(&entries, &SportFilter::Only(SportType::Ride));
    assert!((rides_only[0].tss - 50.0).abs() < f64::EPSILON);
}

#[test]
fn custom_time_constants_change_the_decay() {
    let config = EngineConfig {
        ctl_time_constant_days: 21.0,
        atl_time_constant_days: 3.0,
        ..EngineConfig::default()
    };
    let loads = vec![DailyLoad {
        date: date(1),
        tss: 100.0,
    }];

    let trend = TrendCalculator::new(&config).calculate(&loads);
    assert!((trend[0].ctl - 100.0 / 21.0).abs() < 1e-12);
    assert!((trend[0].atl - 100.0 / 3.0).abs() < 1e-12);
}

#[test]
fn mid_history_edit_invalidates_everything_after_it() {
    let calculator = TrendCalculator::new(&EngineConfig::default());
    let mut loads: Vec<DailyLoad> = (1..=20)
        .map(|day| DailyLoad {
            date: date(day),
            tss: f64::from(day % 5) * 25.0,
        })
        .collect();
    let original = calculator.calculate(&loads);

    loads[9].tss += 60.0;
    let repaired = calculator.splice(&original, &loads, date(10));
    let from_scratch = calculator.calculate(&loads);

    assert_eq!(repaired, from_scratch);
    // Everything before the edit is untouched, everything after moved
    assert_eq!(repaired[..9], original[..9]);
    assert!(repaired[9..]
        .iter()
        .zip(&original[9..])
        .all(|(new, old)| new.ctl != old.ctl));
}
