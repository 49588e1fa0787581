// ABOUTME: Raw sample rows and series exactly as handed over by the ingestion collaborator
// ABOUTME: Supports both row-wise samples and pre-decoded parallel channel arrays
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// One recorded sample, ordered by offset from activity start
///
/// Any channel may be absent on any sample; devices drop channels
/// independently (a power meter dropout does not interrupt heart rate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since activity start
    pub offset_seconds: u32,
    /// Power in watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    /// Heart rate in BPM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    /// Cadence in RPM or steps/min
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    /// Speed in m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    /// Altitude in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    /// Temperature in Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
}

/// An activity's full sample series
///
/// Immutable once ingested; the owning `Activity` carries a revision counter
/// that ingestion bumps when it replaces the series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    /// Samples ordered by `offset_seconds`
    pub samples: Vec<Sample>,
}

impl SampleSeries {
    /// Wrap row-wise samples
    #[must_use]
    pub const fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Build a series from pre-decoded parallel channel arrays
    ///
    /// Channel vectors shorter than `offsets` leave the tail absent; longer
    /// vectors are truncated. This is the shape track-point decoders deliver.
    #[must_use]
    pub fn from_channels(
        offsets: &[u32],
        power: Option<&[f64]>,
        heart_rate: Option<&[f64]>,
        cadence: Option<&[f64]>,
        speed_mps: Option<&[f64]>,
        altitude_m: Option<&[f64]>,
    ) -> Self {
        let channel_at = |channel: Option<&[f64]>, index: usize| -> Option<f64> {
            channel.and_then(|values| values.get(index).copied())
        };

        let samples = offsets
            .iter()
            .enumerate()
            .map(|(index, &offset_seconds)| Sample {
                offset_seconds,
                power: channel_at(power, index),
                heart_rate: channel_at(heart_rate, index),
                cadence: channel_at(cadence, index),
                speed_mps: channel_at(speed_mps, index),
                altitude_m: channel_at(altitude_m, index),
                temperature_c: None,
            })
            .collect();

        Self { samples }
    }

    /// Number of samples in the series
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series has no samples at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_channels_zips_offsets_with_partial_channels() {
        let series = SampleSeries::from_channels(
            &[0, 1, 2],
            Some(&[200.0, 210.0]),
            None,
            None,
            Some(&[8.0, 8.1, 8.2]),
            None,
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series.samples[1].power, Some(210.0));
        assert_eq!(series.samples[2].power, None);
        assert_eq!(series.samples[2].speed_mps, Some(8.2));
        assert_eq!(series.samples[0].heart_rate, None);
    }
}
