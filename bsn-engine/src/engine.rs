// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The mote simulation engine.
//!
//! The [`Engine`] owns all motes, the radio link graph, the event queue and
//! the debug channels. It implements the [`Simulator`] trait which is all a
//! driver needs to configure and step a simulation.

use std::collections::BTreeMap;
use std::rc::Rc;

use bsn_track::channel::Channels;
use bsn_track::entity::{Entity, toplevel};
use bsn_track::tracker::stdout_tracker;
use bsn_track::{SharedWriter, Tracker, debug, info, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::app::{Action, AppFactory, IdleApplication};
use crate::event::{EventKind, EventQueue};
use crate::mac::Mac;
use crate::node::{Mote, MoteHandle};
use crate::noise::DEFAULT_NOISE_HISTORY;
use crate::packet::{AmPacket, DEFAULT_AM_GROUP, MAX_PAYLOAD_BYTES, SerialPacket};
use crate::radio::Radio;
use crate::sim_error;
use crate::time::{TICKS_PER_SECOND, ticks_to_secs};
use crate::traits::{MoteControl, RadioControl, Simulator};
use crate::types::{BROADCAST_ADDR, NodeId, SimError, SimResult, SimTime};

/// Largest number of motes an engine accepts by default.
pub const DEFAULT_MAX_NODES: usize = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub ticks_per_second: SimTime,
    pub max_nodes: usize,
    pub seed: u64,
    pub noise_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: TICKS_PER_SECOND,
            max_nodes: DEFAULT_MAX_NODES,
            seed: 1,
            noise_history: DEFAULT_NOISE_HISTORY,
        }
    }
}

/// Counters collected while the simulation runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineStatistics {
    pub events_run: u64,
    pub packets_sent: u64,
    pub receptions: u64,
    pub receptions_lost: u64,
    pub serial_packets: u64,
}

pub struct Engine {
    toplevel: Rc<Entity>,
    config: EngineConfig,
    initialized: bool,
    now: SimTime,
    queue: EventQueue,
    mac: Mac,
    radio: Radio,
    nodes: BTreeMap<NodeId, Mote>,
    channels: Channels,
    serial_out: Vec<SerialPacket>,
    factory: AppFactory,
    rng: StdRng,
    stats: EngineStatistics,
}

impl Engine {
    /// Create an engine whose motes run no application.
    pub fn new(tracker: &Tracker, config: EngineConfig) -> Self {
        let toplevel = toplevel(tracker, "top");
        let radio = Radio::new(&toplevel);
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            toplevel,
            config,
            initialized: false,
            now: 0,
            queue: EventQueue::new(),
            mac: Mac::default(),
            radio,
            nodes: BTreeMap::new(),
            channels: Channels::new(),
            serial_out: Vec::new(),
            factory: Box::new(|_| Box::new(IdleApplication)),
            rng,
            stats: EngineStatistics::default(),
        }
    }

    /// Install the firmware run by every mote created from now on.
    #[must_use]
    pub fn with_application(mut self, factory: AppFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn top(&self) -> &Rc<Entity> {
        &self.toplevel
    }

    pub fn statistics(&self) -> &EngineStatistics {
        &self.stats
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Run events until the next one is later than `end`. Returns the number
    /// of events run.
    pub fn run_until(&mut self, end: SimTime) -> Result<u64, SimError> {
        let mut count = 0;
        while self.queue.next_time().is_some_and(|t| t <= end) {
            self.run_next_event()?;
            count += 1;
        }
        Ok(count)
    }

    /// Flush the debug channels and the tracker.
    pub fn shutdown(&self) {
        self.channels.flush();
        self.toplevel.tracker.shutdown();
    }

    fn mote_mut(&mut self, id: NodeId) -> Result<&mut Mote, SimError> {
        if usize::from(id) >= self.config.max_nodes {
            return sim_error!(
                "node id {id} out of range, the engine supports {} nodes",
                self.config.max_nodes
            );
        }
        let toplevel = &self.toplevel;
        let factory = &self.factory;
        let config = &self.config;
        Ok(self.nodes.entry(id).or_insert_with(|| {
            Mote::new(toplevel, id, factory(id), config.seed, config.noise_history)
        }))
    }

    fn apply_actions(&mut self, node: NodeId, actions: Vec<Action>) -> SimResult {
        for action in actions {
            match action {
                Action::StartTimer { timer, delay } => {
                    let generation = self.mote_mut(node)?.next_timer_generation(timer);
                    self.queue.schedule(
                        self.now.saturating_add(delay),
                        node,
                        EventKind::Timer { timer, generation },
                    );
                }
                Action::StopTimer { timer } => {
                    self.mote_mut(node)?.next_timer_generation(timer);
                }
                Action::Send {
                    dest,
                    am_type,
                    payload,
                } => {
                    self.transmit(node, dest, am_type, payload)?;
                }
                Action::SerialSend { am_type, payload } => {
                    if payload.len() > MAX_PAYLOAD_BYTES {
                        return sim_error!(
                            "node {node} serial payload of {} bytes is too long",
                            payload.len()
                        );
                    }
                    self.stats.serial_packets += 1;
                    self.serial_out.push(SerialPacket {
                        src: node,
                        dest: BROADCAST_ADDR,
                        am_type,
                        group: DEFAULT_AM_GROUP,
                        payload,
                    });
                }
                Action::Debug { channel, message } => {
                    self.channels
                        .emit(&channel, format_args!("DEBUG ({node}): {message}"));
                }
            }
        }
        Ok(())
    }

    fn transmit(&mut self, src: NodeId, dest: NodeId, am_type: u8, payload: Vec<u8>) -> SimResult {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return sim_error!(
                "node {src} radio payload of {} bytes is too long",
                payload.len()
            );
        }
        self.stats.packets_sent += 1;

        let tps = self.config.ticks_per_second;
        let arrival = self.now
            + self.mac.initial_backoff_ticks(&mut self.rng, tps)
            + self.mac.airtime_ticks(payload.len(), tps);

        let links: Vec<(NodeId, f64)> = self
            .radio
            .links_from(src)
            .filter(|(dst, _)| dest == BROADCAST_ADDR || *dst == dest)
            .collect();

        for (dst, gain) in links {
            let noise = match self.nodes.get_mut(&dst) {
                Some(mote) if mote.is_on() => mote.sample_noise(),
                _ => {
                    trace!(self.radio.entity ; "{src} -> {dst}: receiver off");
                    self.stats.receptions_lost += 1;
                    continue;
                }
            };

            if self.radio.is_received(gain, noise) {
                trace!(self.radio.entity ; "{src} -> {dst}: gain {gain} dB, noise {noise} dBm");
                self.stats.receptions += 1;
                let packet = AmPacket {
                    src,
                    dest,
                    am_type,
                    payload: payload.clone(),
                };
                self.queue.schedule(arrival, dst, EventKind::Receive(packet));
            } else {
                trace!(self.radio.entity ;
                    "{src} -> {dst}: lost, gain {gain} dB below noise {noise} dBm"
                );
                self.stats.receptions_lost += 1;
            }
        }
        Ok(())
    }
}

/// Create a default engine that logs warnings to stdout.
///
/// This is provided to keep documentation examples simple.
impl Default for Engine {
    fn default() -> Self {
        Self::new(&stdout_tracker(), EngineConfig::default())
    }
}

impl Simulator for Engine {
    fn init(&mut self) -> SimResult {
        if self.initialized {
            return sim_error!("engine already initialized");
        }
        self.initialized = true;
        debug!(self.toplevel ; "initialized at {} ticks per second", self.config.ticks_per_second);
        Ok(())
    }

    fn mac(&self) -> &Mac {
        &self.mac
    }

    fn radio(&mut self) -> &mut dyn RadioControl {
        &mut self.radio
    }

    fn node(&mut self, id: NodeId) -> Result<Box<dyn MoteControl + '_>, SimError> {
        let now = self.now;
        let tps = self.config.ticks_per_second;
        self.mote_mut(id)?;
        match self.nodes.get_mut(&id) {
            Some(mote) => Ok(Box::new(MoteHandle::new(mote, &mut self.queue, now, tps))),
            None => sim_error!("node {id} could not be created"),
        }
    }

    fn add_channel(&mut self, channel: &str, writer: SharedWriter) {
        info!(self.toplevel ; "channel {channel} enabled");
        self.channels.add_shared(channel, writer);
    }

    fn time(&self) -> SimTime {
        self.now
    }

    fn ticks_per_second(&self) -> SimTime {
        self.config.ticks_per_second
    }

    fn run_next_event(&mut self) -> Result<bool, SimError> {
        if !self.initialized {
            return sim_error!("engine not initialized");
        }

        let Some(event) = self.queue.pop() else {
            return Ok(false);
        };

        if event.time > self.now {
            self.now = event.time;
            let secs = ticks_to_secs(self.now, self.config.ticks_per_second);
            self.toplevel.tracker.time(self.toplevel.id, secs);
        }
        self.stats.events_run += 1;

        let now = self.now;
        let tps = self.config.ticks_per_second;
        let actions = match self.nodes.get_mut(&event.node) {
            Some(mote) => mote.dispatch(&event.kind, now, tps),
            None => return sim_error!("event scheduled for unknown node {}", event.node),
        };
        self.apply_actions(event.node, actions)?;
        Ok(true)
    }

    fn take_serial_output(&mut self) -> Vec<SerialPacket> {
        std::mem::take(&mut self.serial_out)
    }
}
