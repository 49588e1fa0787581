// ABOUTME: Named constants for effort scoring and pace adjustment formulas
// ABOUTME: Keeps magic numbers out of the hot loops and documents their provenance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Constants used by the effort scoring formulas
pub mod metrics_constants {
    /// TSS scale factor: one hour at threshold intensity scores 100
    pub const TSS_BASE_MULTIPLIER: f64 = 100.0;

    /// Seconds per hour, for duration conversion in TSS
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
}

/// Constants for grade-adjusted pace
pub mod pace_constants {
    /// Minetti et al. (2002) polynomial coefficients for the metabolic cost
    /// of gradient running, highest order first, in J/(kg*m):
    /// `C(g) = 155.4g^5 - 30.4g^4 - 43.3g^3 + 46.3g^2 + 19.5g + 3.6`
    pub const MINETTI_COEFFICIENTS: [f64; 6] = [155.4, -30.4, -43.3, 46.3, 19.5, 3.6];

    /// Metabolic cost of level running, `C(0)`, in J/(kg*m)
    pub const LEVEL_RUNNING_COST: f64 = 3.6;

    /// The Minetti polynomial was measured on grades up to +/-45%;
    /// steeper instantaneous grades are clamped before evaluation
    pub const MAX_ABS_GRADE: f64 = 0.45;
}
