// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Conversions between engine ticks and real time units.

use crate::types::SimTime;

/// Default number of engine ticks in one simulated second.
pub const TICKS_PER_SECOND: SimTime = 10_000_000_000;

/// Convert seconds to ticks, rounding to the nearest tick.
#[must_use]
pub fn secs_to_ticks(secs: f64, ticks_per_second: SimTime) -> SimTime {
    (secs * ticks_per_second as f64).round() as SimTime
}

/// Convert milliseconds to ticks, saturating at the end of time.
#[must_use]
pub fn ms_to_ticks(ms: u64, ticks_per_second: SimTime) -> SimTime {
    checked_ms_to_ticks(ms, ticks_per_second).unwrap_or(SimTime::MAX)
}

/// Convert milliseconds to ticks, or `None` if the result does not fit.
#[must_use]
pub fn checked_ms_to_ticks(ms: u64, ticks_per_second: SimTime) -> Option<SimTime> {
    ms.checked_mul(ticks_per_second).map(|t| t / 1000)
}

#[must_use]
pub fn ticks_to_secs(ticks: SimTime, ticks_per_second: SimTime) -> f64 {
    ticks as f64 / ticks_per_second as f64
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(secs_to_ticks(130.0, TICKS_PER_SECOND), 1_300_000_000_000);
        assert_eq!(ms_to_ticks(50, TICKS_PER_SECOND), 500_000_000);
        assert_eq!(ms_to_ticks(50, 100), 5);
        assert_relative_eq!(ticks_to_secs(250, 100), 2.5);
    }

    #[test]
    fn huge_intervals_do_not_wrap() {
        assert_eq!(checked_ms_to_ticks(2_000_000_000, TICKS_PER_SECOND), None);
        assert_eq!(ms_to_ticks(2_000_000_000, TICKS_PER_SECOND), SimTime::MAX);
        assert_eq!(checked_ms_to_ticks(1_000, TICKS_PER_SECOND), Some(TICKS_PER_SECOND));
    }
}
