// ABOUTME: Converts irregular raw samples into a gap-aware, segmented one-second series
// ABOUTME: Pure transform; recording gaps split segments and nothing is integrated across them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Sample normalization
//!
//! Devices record irregularly: sampling intervals wander, channels drop out
//! independently, and auto-pause leaves multi-minute silences. Downstream
//! window arithmetic wants a dense one-second grid, so the normalizer:
//!
//! - sorts samples by offset (duplicate offsets keep the last sample)
//! - starts a new segment at every gap longer than the configured threshold
//! - fills sub-threshold gaps on the grid by holding the last observation
//! - integrates distance from speed only within a segment
//!
//! A channel value that is explicitly absent on a recorded sample stays
//! absent on the grid; last-observation fill only covers seconds where no
//! sample was recorded at all.

use crate::models::sample::{Sample, SampleSeries};
use serde::{Deserialize, Serialize};

/// A numeric channel on the normalized grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Power in watts
    Power,
    /// Heart rate in BPM
    HeartRate,
    /// Cadence in RPM or steps/min
    Cadence,
    /// Speed in m/s
    Speed,
    /// Altitude in meters
    Altitude,
}

/// One second on the normalized grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSample {
    /// Seconds since activity start
    pub offset_seconds: u32,
    /// Power in watts
    pub power: Option<f64>,
    /// Heart rate in BPM
    pub heart_rate: Option<f64>,
    /// Cadence in RPM or steps/min
    pub cadence: Option<f64>,
    /// Speed in m/s
    pub speed_mps: Option<f64>,
    /// Altitude in meters
    pub altitude_m: Option<f64>,
}

impl GridSample {
    fn from_sample(offset_seconds: u32, sample: &Sample) -> Self {
        Self {
            offset_seconds,
            power: sample.power,
            heart_rate: sample.heart_rate,
            cadence: sample.cadence,
            speed_mps: sample.speed_mps,
            altitude_m: sample.altitude_m,
        }
    }

    /// Value of one channel at this second
    #[must_use]
    pub const fn channel(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Power => self.power,
            Channel::HeartRate => self.heart_rate,
            Channel::Cadence => self.cadence,
            Channel::Speed => self.speed_mps,
            Channel::Altitude => self.altitude_m,
        }
    }
}

/// A continuous stretch of recording with no gap above the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Offset of the segment's first grid second
    pub start_offset: u32,
    /// One entry per second, consecutive offsets
    pub seconds: Vec<GridSample>,
    /// Distance integrated from speed within this segment, meters
    pub distance_m: Option<f64>,
}

impl Segment {
    /// Number of grid seconds in this segment
    #[must_use]
    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    /// Whether the segment holds no grid seconds
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }
}

/// A dense stretch of one channel's values within a single segment
///
/// Best-window searches operate per run, so no window ever spans a recording
/// gap or a channel dropout.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRun {
    /// Offset of the run's first value
    pub start_offset: u32,
    /// One value per second
    pub values: Vec<f64>,
}

/// The normalizer output: an activity's segmented one-second series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSeries {
    /// Continuous segments in offset order
    pub segments: Vec<Segment>,
}

impl NormalizedSeries {
    /// Total grid seconds across all segments
    #[must_use]
    pub fn grid_len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Whether the activity produced no usable grid at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total in-segment distance, absent when no speed was ever observed
    #[must_use]
    pub fn total_distance_m(&self) -> Option<f64> {
        let observed: Vec<f64> = self
            .segments
            .iter()
            .filter_map(|segment| segment.distance_m)
            .collect();
        if observed.is_empty() {
            None
        } else {
            Some(observed.iter().sum())
        }
    }

    /// Dense runs of one channel, split on segment boundaries and dropouts
    #[must_use]
    pub fn channel_runs(&self, channel: Channel) -> Vec<ChannelRun> {
        self.runs_where(|segment, index| segment.seconds[index].channel(channel))
    }

    /// Dense pace runs (seconds per meter) derived from the speed channel
    ///
    /// Pace is undefined while standing still, so non-positive speed seconds
    /// split runs the same way dropouts do.
    #[must_use]
    pub fn pace_runs(&self) -> Vec<ChannelRun> {
        self.runs_where(|segment, index| {
            segment.seconds[index]
                .speed_mps
                .filter(|speed| *speed > f64::EPSILON)
                .map(|speed| 1.0 / speed)
        })
    }

    /// Collect dense runs of a derived per-second value
    ///
    /// `value_at` is evaluated per grid second; a `None` closes the current
    /// run. Segment boundaries always close runs, so no run ever spans a
    /// recording gap.
    pub fn runs_where(
        &self,
        value_at: impl Fn(&Segment, usize) -> Option<f64>,
    ) -> Vec<ChannelRun> {
        let mut runs = Vec::new();
        for segment in &self.segments {
            let mut current: Option<ChannelRun> = None;
            for (index, second) in segment.seconds.iter().enumerate() {
                match (value_at(segment, index), current.as_mut()) {
                    (Some(value), Some(run)) => run.values.push(value),
                    (Some(value), None) => {
                        current = Some(ChannelRun {
                            start_offset: second.offset_seconds,
                            values: vec![value],
                        });
                    }
                    (None, Some(_)) => {
                        if let Some(run) = current.take() {
                            runs.push(run);
                        }
                    }
                    (None, None) => {}
                }
            }
            if let Some(run) = current.take() {
                runs.push(run);
            }
        }
        runs
    }
}

/// Gap-aware sample normalizer
#[derive(Debug, Clone, Copy)]
pub struct SampleNormalizer {
    gap_threshold_seconds: u32,
}

impl SampleNormalizer {
    /// Create a normalizer with the given gap threshold in seconds
    #[must_use]
    pub const fn new(gap_threshold_seconds: u32) -> Self {
        Self {
            gap_threshold_seconds,
        }
    }

    /// Normalize a raw series onto the segmented one-second grid
    ///
    /// An empty input yields an empty output; a single sample yields a
    /// single one-second segment.
    #[must_use]
    pub fn normalize(&self, series: &SampleSeries) -> NormalizedSeries {
        if series.is_empty() {
            return NormalizedSeries::default();
        }

        let ordered = Self::order_samples(&series.samples);

        let mut segments = Vec::new();
        let mut seconds: Vec<GridSample> = Vec::new();

        for (index, sample) in ordered.iter().enumerate() {
            if let Some(prev_offset) = seconds.last().map(|second| second.offset_seconds) {
                let delta = sample.offset_seconds - prev_offset;
                if delta > self.gap_threshold_seconds {
                    segments.push(Self::finish_segment(std::mem::take(&mut seconds)));
                } else if delta > 1 {
                    // Hold the previous observation over sub-threshold gap seconds
                    let held = &ordered[index - 1];
                    for filled_offset in (prev_offset + 1)..sample.offset_seconds {
                        seconds.push(GridSample::from_sample(filled_offset, held));
                    }
                }
            }
            seconds.push(GridSample::from_sample(sample.offset_seconds, sample));
        }
        if !seconds.is_empty() {
            segments.push(Self::finish_segment(seconds));
        }

        NormalizedSeries { segments }
    }

    /// Sort by offset; on duplicate offsets the last sample wins
    fn order_samples(samples: &[Sample]) -> Vec<Sample> {
        let mut ordered = samples.to_vec();
        ordered.sort_by_key(|sample| sample.offset_seconds);
        ordered.dedup_by(|next, kept| {
            if next.offset_seconds == kept.offset_seconds {
                *kept = next.clone();
                true
            } else {
                false
            }
        });
        ordered
    }

    fn finish_segment(seconds: Vec<GridSample>) -> Segment {
        let start_offset = seconds.first().map_or(0, |second| second.offset_seconds);
        let speed_seconds: Vec<f64> = seconds
            .iter()
            .filter_map(|second| second.speed_mps)
            .collect();
        let distance_m = if speed_seconds.is_empty() {
            None
        } else {
            Some(speed_seconds.iter().sum())
        };
        Segment {
            start_offset,
            seconds,
            distance_m,
        }
    }
}
