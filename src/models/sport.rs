// ABOUTME: Sport classification used to pick the primary metric and objective direction
// ABOUTME: Mirrors the provider-facing sport taxonomy, trimmed to what the engine scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of sport for an activity
///
/// The engine never branches on sport names inside numeric loops; sports map
/// to an objective direction and a primary channel once, at configuration
/// level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Running activity
    Run,
    /// Cycling/biking activity
    Ride,
    /// Swimming activity
    Swim,
    /// Walking activity
    Walk,
    /// Hiking activity
    Hike,
    /// Indoor/trainer cycling activity
    VirtualRide,
    /// Treadmill running activity
    VirtualRun,
    /// Rowing activity
    Rowing,
    /// Cross-country skiing
    NordicSki,
    /// Any sport not covered above
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Ride => write!(f, "ride"),
            Self::Swim => write!(f, "swim"),
            Self::Walk => write!(f, "walk"),
            Self::Hike => write!(f, "hike"),
            Self::VirtualRide => write!(f, "virtual_ride"),
            Self::VirtualRun => write!(f, "virtual_run"),
            Self::Rowing => write!(f, "rowing"),
            Self::NordicSki => write!(f, "nordic_ski"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}
