// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Paces the simulation against the wall clock.
//!
//! Every `interval_ms` of simulated time the throttle compares how far the
//! simulation has advanced with how much wall-clock time has passed and
//! sleeps while the simulation is ahead. A speed of 2.0 replays the
//! simulation twice as fast as real time.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use bsn_engine::sim_error;
use bsn_engine::time::{checked_ms_to_ticks, ticks_to_secs};
use bsn_engine::types::{SimError, SimResult, SimTime};

/// What the throttle did during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThrottleStatistics {
    pub initialized: bool,
    pub checks: u64,
    pub sleeps: u64,
    pub slept: Duration,
    pub simulated_secs: f64,
    pub wall_secs: f64,
}

impl fmt::Display for ThrottleStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Throttle statistics:")?;
        if !self.initialized {
            writeln!(f, "  throttle not initialized")?;
        }
        writeln!(f, "  simulated time: {:.3}s", self.simulated_secs)?;
        writeln!(f, "  wall-clock time: {:.3}s", self.wall_secs)?;
        writeln!(f, "  checks: {}", self.checks)?;
        write!(
            f,
            "  sleeps: {} ({:.3}s)",
            self.sleeps,
            self.slept.as_secs_f64()
        )
    }
}

struct Start {
    sim_time: SimTime,
    wall_time: Instant,
    ticks_per_second: SimTime,
    interval: SimTime,
}

pub struct Throttle {
    interval_ms: u64,
    speed: f64,
    start: Option<Start>,
    next_check: SimTime,
    last_time: SimTime,
    checks: u64,
    sleeps: u64,
    slept: Duration,
}

impl Throttle {
    pub fn new(interval_ms: u64, speed: f64) -> Result<Self, SimError> {
        if !(speed.is_finite() && speed > 0.0) {
            return sim_error!("throttle speed must be a positive number, found {speed}");
        }
        Ok(Self {
            interval_ms,
            speed,
            start: None,
            next_check: 0,
            last_time: 0,
            checks: 0,
            sleeps: 0,
            slept: Duration::ZERO,
        })
    }

    /// Start pacing from simulated time `now`.
    pub fn initialize(&mut self, now: SimTime, ticks_per_second: SimTime) -> SimResult {
        let Some(interval) = checked_ms_to_ticks(self.interval_ms, ticks_per_second) else {
            return sim_error!(
                "throttle interval of {}ms overflows the simulator's clock",
                self.interval_ms
            );
        };
        self.start = Some(Start {
            sim_time: now,
            wall_time: Instant::now(),
            ticks_per_second,
            interval: interval.max(1),
        });
        self.next_check = now;
        self.last_time = now;
        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.start.is_some()
    }

    /// Sleep while the simulation at `now` is ahead of the wall clock.
    pub fn check_throttle(&mut self, now: SimTime) -> SimResult {
        let Some(start) = &self.start else {
            return sim_error!("throttle checked before it was initialized");
        };
        self.checks += 1;
        self.last_time = now;
        if now < self.next_check {
            return Ok(());
        }
        self.next_check = now.saturating_add(start.interval);

        let simulated = ticks_to_secs(now.saturating_sub(start.sim_time), start.ticks_per_second);
        let target = Duration::from_secs_f64(simulated / self.speed);
        let elapsed = start.wall_time.elapsed();
        if target > elapsed {
            let pause = target - elapsed;
            thread::sleep(pause);
            self.sleeps += 1;
            self.slept += pause;
        }
        Ok(())
    }

    #[must_use]
    pub fn statistics(&self) -> ThrottleStatistics {
        match &self.start {
            None => ThrottleStatistics::default(),
            Some(start) => ThrottleStatistics {
                initialized: true,
                checks: self.checks,
                sleeps: self.sleeps,
                slept: self.slept,
                simulated_secs: ticks_to_secs(
                    self.last_time.saturating_sub(start.sim_time),
                    start.ticks_per_second,
                ),
                wall_secs: start.wall_time.elapsed().as_secs_f64(),
            },
        }
    }
}
