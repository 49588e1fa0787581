// ABOUTME: Effort scoring: Normalized Power, Intensity Factor, TSS, and Variability Index
// ABOUTME: Includes the grade-adjusted pace path used for run-type sports without power
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Effort scoring
//!
//! Power sports score against threshold power; pace sports score against
//! threshold pace using Normalized Graded Pace. Both share the same
//! normalization pipeline: a 30-second rolling average over each dense run
//! (resetting at segment boundaries and dropouts), a 4th-power mean across
//! the whole activity, and a 4th root.
//!
//! # Scientific References
//!
//! - Coggan, A. & Allen, H. (2010). "Training and Racing with a Power
//!   Meter." `VeloPress`. (NP, IF, TSS, VI)
//! - Minetti, A. E. et al. (2002). "Energy cost of walking and running at
//!   extreme uphill and downhill slopes." *J Appl Physiol*, 93(3),
//!   1039-1046. (grade adjustment polynomial)

use crate::config::EngineConfig;
use crate::intelligence::normalizer::{Channel, ChannelRun, GridSample, NormalizedSeries};
use crate::intelligence::physiological_constants::{metrics_constants, pace_constants};
use serde::{Deserialize, Serialize};

/// Which reference threshold an activity is scored against
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringMode {
    /// Score power in watts against Functional Threshold Power
    Power {
        /// FTP in watts, absent when the athlete has none on file
        threshold_watts: Option<f64>,
    },
    /// Score grade-adjusted speed against threshold pace
    Pace {
        /// Threshold speed in m/s, absent when the athlete has none on file
        threshold_mps: Option<f64>,
    },
}

/// Per-activity effort scores
///
/// Every field is optional; a score that could not be computed stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffortScores {
    /// Average power in watts over seconds with power data
    pub avg_power: Option<f64>,
    /// Maximum one-second power in watts
    pub max_power: Option<f64>,
    /// Normalized Power (watts) or Normalized Graded Pace (m/s)
    pub normalized_power: Option<f64>,
    /// Normalized effort relative to the reference threshold
    pub intensity_factor: Option<f64>,
    /// Training Stress Score
    pub training_stress_score: Option<f64>,
    /// Pacing steadiness: normalized over average of the scored metric
    pub variability_index: Option<f64>,
}

/// Effort score calculator
pub struct EffortScorer {
    rolling_window_seconds: u32,
}

impl EffortScorer {
    /// Build a scorer from a validated configuration
    #[must_use]
    pub const fn new(config: &EngineConfig) -> Self {
        Self {
            rolling_window_seconds: config.rolling_window_seconds,
        }
    }

    /// Score one activity's normalized series
    ///
    /// `duration_seconds` is the activity's recorded elapsed duration; TSS
    /// scales with it, not with the number of grid seconds.
    #[must_use]
    pub fn score(
        &self,
        series: &NormalizedSeries,
        mode: ScoringMode,
        duration_seconds: u64,
    ) -> EffortScores {
        let power_runs = series.channel_runs(Channel::Power);
        let mut scores = EffortScores {
            avg_power: run_average(&power_runs),
            max_power: run_max(&power_runs),
            ..EffortScores::default()
        };

        match mode {
            ScoringMode::Power { threshold_watts } => {
                let avg_power = scores.avg_power;
                self.score_metric(
                    &mut scores,
                    &power_runs,
                    avg_power,
                    threshold_watts,
                    duration_seconds,
                );
            }
            ScoringMode::Pace { threshold_mps } => {
                let graded_runs = grade_adjusted_speed_runs(series);
                let avg_graded = run_average(&graded_runs);
                self.score_metric(
                    &mut scores,
                    &graded_runs,
                    avg_graded,
                    threshold_mps,
                    duration_seconds,
                );
            }
        }

        scores
    }

    /// Shared normalization pipeline for the scored metric
    fn score_metric(
        &self,
        scores: &mut EffortScores,
        runs: &[ChannelRun],
        metric_average: Option<f64>,
        threshold: Option<f64>,
        duration_seconds: u64,
    ) {
        let window = self.rolling_window_seconds as usize;
        let rolling = rolling_means(runs, window);
        let normalized = normalized_average(&rolling);
        scores.normalized_power = normalized;

        let Some(normalized) = normalized else {
            return;
        };

        if let Some(threshold) = threshold.filter(|value| value.is_finite() && *value > 0.0) {
            let intensity = normalized / threshold;
            scores.intensity_factor = Some(intensity);
            let duration_hours =
                duration_seconds as f64 / metrics_constants::SECONDS_PER_HOUR;
            scores.training_stress_score =
                Some(duration_hours * intensity * intensity * metrics_constants::TSS_BASE_MULTIPLIER);
        }

        if let Some(average) = metric_average.filter(|value| *value > 0.0) {
            scores.variability_index = Some(normalized / average);
        }
    }
}

/// Mean over all values of all runs
fn run_average(runs: &[ChannelRun]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for run in runs {
        sum += run.values.iter().sum::<f64>();
        count += run.values.len();
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Maximum over all values of all runs
fn run_max(runs: &[ChannelRun]) -> Option<f64> {
    runs.iter()
        .flat_map(|run| run.values.iter().copied())
        .fold(None, |best, value| match best {
            Some(current) if current >= value => Some(current),
            _ => Some(value),
        })
}

/// Rolling window averages, resetting at every run boundary
///
/// Runs shorter than the window contribute nothing; a window never spans a
/// gap or dropout.
fn rolling_means(runs: &[ChannelRun], window: usize) -> Vec<f64> {
    let mut rolling = Vec::new();
    for run in runs {
        if run.values.len() < window {
            continue;
        }
        let mut sum: f64 = run.values[..window].iter().sum();
        rolling.push(sum / window as f64);
        for index in window..run.values.len() {
            sum += run.values[index] - run.values[index - window];
            rolling.push(sum / window as f64);
        }
    }
    rolling
}

/// 4th-power mean and 4th root over the rolling values
fn normalized_average(rolling: &[f64]) -> Option<f64> {
    if rolling.is_empty() {
        return None;
    }
    let fourth_power_mean =
        rolling.iter().map(|value| value.powi(4)).sum::<f64>() / rolling.len() as f64;
    Some(fourth_power_mean.powf(0.25))
}

/// Grade-adjusted speed runs for pace scoring
///
/// Each second's speed is scaled by the Minetti cost ratio for its
/// instantaneous grade, mapping hill running onto equivalent flat speed.
/// Seconds without altitude data pass through unadjusted.
fn grade_adjusted_speed_runs(series: &NormalizedSeries) -> Vec<ChannelRun> {
    series.runs_where(|segment, index| {
        let second = &segment.seconds[index];
        second.speed_mps.map(|speed| {
            let grade = instantaneous_grade(segment.seconds.get(index + 1), second, speed);
            speed * grade_cost_factor(grade)
        })
    })
}

/// Rise over run for one grid second, clamped to the polynomial's domain
fn instantaneous_grade(next: Option<&GridSample>, current: &GridSample, speed: f64) -> f64 {
    if speed <= f64::EPSILON {
        return 0.0;
    }
    let (Some(next), Some(here)) = (next.and_then(|sample| sample.altitude_m), current.altitude_m)
    else {
        return 0.0;
    };
    let grade = (next - here) / speed;
    grade.clamp(-pace_constants::MAX_ABS_GRADE, pace_constants::MAX_ABS_GRADE)
}

/// Minetti metabolic cost of gradient running relative to level running
fn grade_cost_factor(grade: f64) -> f64 {
    let cost = pace_constants::MINETTI_COEFFICIENTS
        .iter()
        .fold(0.0, |acc, coefficient| acc * grade + coefficient);
    cost / pace_constants::LEVEL_RUNNING_COST
}
