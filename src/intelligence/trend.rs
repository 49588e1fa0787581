// ABOUTME: Fitness-fatigue trend model: chronic/acute load recurrence over daily TSS
// ABOUTME: Gap days count as zero-TSS days; the recurrence runs in strict date order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Fitness-fatigue trend model
//!
//! Chronic Training Load (fitness) and Acute Training Load (fatigue) follow
//! the same impulse-response recurrence with different time constants:
//!
//! `load[i] = load[i-1] + (TSS[i] - load[i-1]) / tau`
//!
//! Training Stress Balance (form) uses the prior-day convention throughout:
//! `TSB[i] = CTL[i-1] - ATL[i-1]`, so form reflects the state an athlete
//! brings into the day, not including the day's own training.
//!
//! The recurrence is not invertible: editing a day in the middle of history
//! invalidates everything after it, which is what [`TrendCalculator::splice`]
//! expresses. It is also inherently sequential and must never be
//! parallelized across days.

use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::models::trend::{DailyLoad, DailyLoadEntry, SportFilter, TrendPoint};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Calculator for the chronic/acute load recurrence
pub struct TrendCalculator {
    ctl_time_constant_days: f64,
    atl_time_constant_days: f64,
}

impl TrendCalculator {
    /// Build a calculator from a validated configuration
    #[must_use]
    pub const fn new(config: &EngineConfig) -> Self {
        Self {
            ctl_time_constant_days: config.ctl_time_constant_days,
            atl_time_constant_days: config.atl_time_constant_days,
        }
    }

    /// Aggregate per-activity load entries into one load per date
    ///
    /// Combined mode sums TSS per date across sports; single-sport mode
    /// filters first. Output is sorted by date with unique dates and is not
    /// gap-filled; the recurrence fills gaps itself.
    #[must_use]
    pub fn aggregate_daily(entries: &[DailyLoadEntry], filter: &SportFilter) -> Vec<DailyLoad> {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for entry in entries {
            if filter.matches(&entry.sport) {
                *by_date.entry(entry.date).or_insert(0.0) += entry.tss;
            }
        }
        by_date
            .into_iter()
            .map(|(date, tss)| DailyLoad { date, tss })
            .collect()
    }

    /// Run the recurrence over an athlete's full history
    ///
    /// Days between the first and last load date with no entry count as
    /// zero-TSS days; they decay fitness and fatigue but are never skipped.
    /// Both loads seed at zero, so `TSB` of the first day is zero.
    #[must_use]
    pub fn calculate(&self, loads: &[DailyLoad]) -> Vec<TrendPoint> {
        let Some(first) = loads.iter().map(|load| load.date).min() else {
            return Vec::new();
        };
        let last = loads
            .iter()
            .map(|load| load.date)
            .max()
            .unwrap_or(first);

        let seed = TrendPoint {
            date: first.pred_opt().unwrap_or(first),
            ctl: 0.0,
            atl: 0.0,
            tsb: 0.0,
        };
        self.advance(seed, loads, first, last)
    }

    /// Advance an existing trend by exactly one day
    ///
    /// # Errors
    ///
    /// Returns `AppError::invalid_input` when `load.date` is not the day
    /// after `previous.date`; anything else needs a forward recompute, not
    /// an append.
    pub fn append_day(&self, previous: &TrendPoint, load: DailyLoad) -> AppResult<TrendPoint> {
        let expected = previous
            .date
            .succ_opt()
            .ok_or_else(|| AppError::internal("date overflow advancing trend"))?;
        if load.date != expected {
            return Err(AppError::invalid_input(format!(
                "cannot append {} after {}; the recurrence only advances day by day",
                load.date, previous.date
            )));
        }
        Ok(self.step(previous, load.tss, load.date))
    }

    /// Recompute the trend from an edited day forward
    ///
    /// Points before `edited_from` are kept as-is; everything at or after it
    /// is recomputed from the complete load history. The recurrence cannot
    /// be patched locally, so this is the cheapest correct repair.
    #[must_use]
    pub fn splice(
        &self,
        existing: &[TrendPoint],
        loads: &[DailyLoad],
        edited_from: NaiveDate,
    ) -> Vec<TrendPoint> {
        let mut retained: Vec<TrendPoint> = existing
            .iter()
            .filter(|point| point.date < edited_from)
            .copied()
            .collect();

        let Some(last_load_date) = loads.iter().map(|load| load.date).max() else {
            return retained;
        };

        let (seed, start) = match retained.last() {
            Some(last_kept) => match last_kept.date.succ_opt() {
                Some(next) => (*last_kept, next),
                None => return retained,
            },
            None => {
                let first = loads
                    .iter()
                    .map(|load| load.date)
                    .min()
                    .unwrap_or(edited_from);
                let seed = TrendPoint {
                    date: first.pred_opt().unwrap_or(first),
                    ctl: 0.0,
                    atl: 0.0,
                    tsb: 0.0,
                };
                (seed, first)
            }
        };

        if start > last_load_date {
            return retained;
        }
        retained.extend(self.advance(seed, loads, start, last_load_date));
        retained
    }

    /// Run the recurrence day by day from `start` through `end` inclusive
    fn advance(
        &self,
        seed: TrendPoint,
        loads: &[DailyLoad],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<TrendPoint> {
        let by_date: BTreeMap<NaiveDate, f64> = loads
            .iter()
            .map(|load| (load.date, load.tss))
            .collect();

        let mut points = Vec::new();
        let mut previous = seed;
        let mut date = start;
        while date <= end {
            let tss = by_date.get(&date).copied().unwrap_or(0.0);
            let point = self.step(&previous, tss, date);
            points.push(point);
            previous = point;
            let Some(next) = date.succ_opt() else { break };
            date = next;
        }
        points
    }

    /// One day of the recurrence with the prior-day TSB convention
    fn step(&self, previous: &TrendPoint, tss: f64, date: NaiveDate) -> TrendPoint {
        TrendPoint {
            date,
            ctl: previous.ctl + (tss - previous.ctl) / self.ctl_time_constant_days,
            atl: previous.atl + (tss - previous.atl) / self.atl_time_constant_days,
            tsb: previous.ctl - previous.atl,
        }
    }
}
