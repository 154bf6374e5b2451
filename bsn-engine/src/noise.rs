// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Closest-pattern-matching noise model.
//!
//! A mote's noise model is built from a recorded trace of noise floor
//! readings (in dBm). For every run of `history` consecutive readings in the
//! trace the model remembers which readings followed it. Sampling then looks
//! up the mote's most recent `history` samples and draws one of the readings
//! that followed the same pattern in the trace. Patterns never seen in the
//! trace fall back to a reading drawn from the whole trace.

use std::collections::{HashMap, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::sim_error;
use crate::types::SimError;

/// Noise floor assumed for motes without a noise model.
pub const NOISE_FLOOR_DBM: i32 = -98;

/// Default number of past readings used as the matching pattern.
pub const DEFAULT_NOISE_HISTORY: usize = 3;

#[derive(Clone, Debug)]
pub struct NoiseModel {
    history_len: usize,
    readings: Vec<i32>,
    next_after: HashMap<Vec<i32>, Vec<i32>>,
    history: VecDeque<i32>,
}

impl NoiseModel {
    /// Build a model from a trace.
    pub fn build(readings: &[i32], history_len: usize) -> Result<Self, SimError> {
        if readings.is_empty() {
            return sim_error!("cannot create a noise model without noise readings");
        }

        let mut next_after: HashMap<Vec<i32>, Vec<i32>> = HashMap::new();
        if history_len > 0 {
            for window in readings.windows(history_len + 1) {
                let (pattern, next) = window.split_at(history_len);
                next_after.entry(pattern.to_vec()).or_default().push(next[0]);
            }
        }

        let history = readings.iter().take(history_len).copied().collect();
        Ok(Self {
            history_len,
            readings: readings.to_vec(),
            next_after,
            history,
        })
    }

    /// Draw the next noise reading.
    pub fn sample<R: Rng>(&mut self, rng: &mut R) -> i32 {
        let key: Vec<i32> = self.history.iter().copied().collect();
        let candidates = match self.next_after.get(&key) {
            Some(candidates) => candidates.as_slice(),
            None => self.readings.as_slice(),
        };

        // Neither slice can be empty, the trace was checked when building
        let value = candidates.choose(rng).copied().unwrap_or(NOISE_FLOOR_DBM);

        if self.history_len > 0 {
            if self.history.len() == self.history_len {
                self.history.pop_front();
            }
            self.history.push_back(value);
        }
        value
    }

    #[must_use]
    pub fn num_patterns(&self) -> usize {
        self.next_after.len()
    }

    #[must_use]
    pub fn num_readings(&self) -> usize {
        self.readings.len()
    }
}
