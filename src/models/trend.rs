// ABOUTME: Daily training load and fitness-fatigue trend point models
// ABOUTME: Day-keyed values feeding the chronic/acute load recurrence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::sport::SportType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One activity's contribution to a day, as returned by the repository
///
/// Kept per-sport so combined-sport and single-sport trend modes can
/// aggregate or filter before the recurrence runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLoadEntry {
    /// Local date the activity counts toward
    pub date: NaiveDate,
    /// Sport of the contributing activity
    pub sport: SportType,
    /// Training Stress Score of the contributing activity
    pub tss: f64,
}

/// Aggregated training load for one day
///
/// A day with no activities is a legitimate zero-TSS day, distinct from a
/// day whose TSS could not be computed (those contribute nothing and are
/// reported by the backfill coordinator instead).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyLoad {
    /// The day
    pub date: NaiveDate,
    /// Summed TSS across the day's activities
    pub tss: f64,
}

/// Sport selection for trend computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportFilter {
    /// Aggregate TSS per date across all sports
    Combined,
    /// Keep only one sport's activities
    Only(SportType),
}

impl SportFilter {
    /// Whether an entry passes this filter
    #[must_use]
    pub fn matches(&self, sport: &SportType) -> bool {
        match self {
            Self::Combined => true,
            Self::Only(selected) => selected == sport,
        }
    }
}

/// One day on the fitness-fatigue trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// The day
    pub date: NaiveDate,
    /// Chronic Training Load - long-term fitness
    pub ctl: f64,
    /// Acute Training Load - short-term fatigue
    pub atl: f64,
    /// Training Stress Balance - form going into the day (prior-day CTL - ATL)
    pub tsb: f64,
}
