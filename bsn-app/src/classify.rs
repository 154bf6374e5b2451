// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Activity classification and the central node's decision rule.

use std::collections::BTreeMap;

use crate::msg::Activity;

/// Below this standard deviation the body is still.
pub const M_THR: f64 = 0.5;

/// Below this standard deviation the body is moving, above it is in crisis.
pub const C_THR: f64 = 2.0;

/// Population standard deviation. Zero for an empty buffer.
#[must_use]
pub fn std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[must_use]
pub fn classify(samples: &[f64]) -> Activity {
    let sd = std_dev(samples);
    if sd < M_THR {
        Activity::NoMovement
    } else if sd < C_THR {
        Activity::Movement
    } else {
        Activity::Crisis
    }
}

/// Majority vote over the peripheral classifications.
///
/// A tie goes to the more severe class. Returns `None` without votes.
#[must_use]
pub fn decide<'a>(votes: impl IntoIterator<Item = &'a Activity>) -> Option<Activity> {
    let mut counts: BTreeMap<Activity, usize> = BTreeMap::new();
    for vote in votes {
        *counts.entry(*vote).or_default() += 1;
    }
    // Iterating in severity order makes `max_by_key` keep the last, most
    // severe, of equal counts
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(activity, _)| activity)
}
