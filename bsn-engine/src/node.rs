// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A simulated mote and the handle the driver uses to configure it.

use std::collections::HashMap;
use std::rc::Rc;

use bsn_track::entity::Entity;
use bsn_track::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::app::{Action, AppContext, Application, TimerId};
use crate::event::{EventKind, EventQueue};
use crate::noise::{NOISE_FLOOR_DBM, NoiseModel};
use crate::sim_error;
use crate::time::ticks_to_secs;
use crate::traits::MoteControl;
use crate::types::{NodeId, SimError, SimResult, SimTime};

pub struct Mote {
    pub entity: Rc<Entity>,
    id: NodeId,
    boot_time: Option<SimTime>,
    on: bool,
    noise_readings: Vec<i32>,
    noise_model: Option<NoiseModel>,
    noise_history: usize,
    timer_generations: HashMap<TimerId, u64>,
    app: Box<dyn Application>,
    rng: StdRng,
}

impl Mote {
    pub fn new(
        parent: &Rc<Entity>,
        id: NodeId,
        app: Box<dyn Application>,
        seed: u64,
        noise_history: usize,
    ) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, &format!("node{id}"))),
            id,
            boot_time: None,
            on: false,
            noise_readings: Vec::new(),
            noise_model: None,
            noise_history,
            timer_generations: HashMap::new(),
            app,
            rng: StdRng::seed_from_u64(seed ^ (u64::from(id) << 32)),
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Draw the noise this mote hears while a packet arrives.
    pub fn sample_noise(&mut self) -> i32 {
        match &mut self.noise_model {
            Some(model) => model.sample(&mut self.rng),
            None => NOISE_FLOOR_DBM,
        }
    }

    /// Invalidate any pending expiry of `timer` and return the generation a
    /// newly scheduled expiry must carry.
    pub fn next_timer_generation(&mut self, timer: TimerId) -> u64 {
        let generation = self.timer_generations.entry(timer).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Run the application for one event and return the actions it took.
    pub fn dispatch(
        &mut self,
        kind: &EventKind,
        now: SimTime,
        ticks_per_second: SimTime,
    ) -> Vec<Action> {
        let mut ctx = AppContext::new(self.id, now, ticks_per_second, &mut self.rng);
        match kind {
            EventKind::Boot => {
                self.on = true;
                debug!(self.entity ; "booted at {:.3}s", ticks_to_secs(now, ticks_per_second));
                self.app.booted(&mut ctx);
            }
            EventKind::Timer { timer, generation } => {
                let current = self.timer_generations.get(timer).copied().unwrap_or(0);
                if self.on && current == *generation {
                    self.app.timer_fired(&mut ctx, *timer);
                }
            }
            EventKind::Receive(packet) => {
                if self.on {
                    self.app.received(&mut ctx, packet);
                }
            }
        }
        ctx.into_actions()
    }
}

/// Borrowed view of a [`Mote`] that can schedule its boot.
pub struct MoteHandle<'a> {
    mote: &'a mut Mote,
    queue: &'a mut EventQueue,
    now: SimTime,
    ticks_per_second: SimTime,
}

impl<'a> MoteHandle<'a> {
    pub fn new(
        mote: &'a mut Mote,
        queue: &'a mut EventQueue,
        now: SimTime,
        ticks_per_second: SimTime,
    ) -> Self {
        Self {
            mote,
            queue,
            now,
            ticks_per_second,
        }
    }
}

impl MoteControl for MoteHandle<'_> {
    fn id(&self) -> NodeId {
        self.mote.id
    }

    fn boot_at_time(&mut self, time: SimTime) -> SimResult {
        let id = self.mote.id;
        if let Some(boot_time) = self.mote.boot_time {
            return sim_error!("node {id} already scheduled to boot at tick {boot_time}");
        }
        if time < self.now {
            return sim_error!(
                "node {id} cannot boot at tick {time}, the simulation is at tick {}",
                self.now
            );
        }

        self.mote.boot_time = Some(time);
        self.queue.schedule(time, id, EventKind::Boot);
        info!(self.mote.entity ; "will boot at {:.3}s", ticks_to_secs(time, self.ticks_per_second));
        Ok(())
    }

    fn add_noise_trace_reading(&mut self, reading: i32) -> SimResult {
        if self.mote.noise_model.is_some() {
            return sim_error!(
                "node {} already has a noise model, readings can no longer be added",
                self.mote.id
            );
        }
        self.mote.noise_readings.push(reading);
        Ok(())
    }

    fn create_noise_model(&mut self) -> SimResult {
        let id = self.mote.id;
        if self.mote.noise_model.is_some() {
            return sim_error!("node {id} already has a noise model");
        }
        let model = NoiseModel::build(&self.mote.noise_readings, self.mote.noise_history)
            .map_err(|e| SimError(format!("node {id}: {}", e.0)))?;
        debug!(self.mote.entity ;
            "noise model built from {} readings with {} patterns",
            model.num_readings(),
            model.num_patterns()
        );
        self.mote.noise_model = Some(model);
        Ok(())
    }

    fn noise_reading_count(&self) -> usize {
        self.mote.noise_readings.len()
    }

    fn is_on(&self) -> bool {
        self.mote.on
    }
}
