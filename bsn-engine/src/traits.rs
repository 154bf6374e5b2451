// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The interface a simulation driver uses to control a mote simulator.
//!
//! Every call reports failure explicitly. In particular
//! [`Simulator::run_next_event`] distinguishes an engine that has run out of
//! events (`Ok(false)`) from one that failed (`Err`).

use bsn_track::SharedWriter;

use crate::mac::Mac;
use crate::packet::SerialPacket;
use crate::types::{NodeId, SimError, SimResult, SimTime};

/// A discrete-event mote simulator.
pub trait Simulator {
    /// Prepare the simulator for a run. Must be called before any event runs.
    fn init(&mut self) -> SimResult;

    /// Medium access parameters.
    fn mac(&self) -> &Mac;

    /// The radio link graph.
    fn radio(&mut self) -> &mut dyn RadioControl;

    /// Look up (creating on first use) the mote with the given id.
    fn node(&mut self, id: NodeId) -> Result<Box<dyn MoteControl + '_>, SimError>;

    /// Attach a writer to a named debug channel. A writer attached to several
    /// channels receives each line once.
    fn add_channel(&mut self, channel: &str, writer: SharedWriter);

    /// Current simulated time.
    fn time(&self) -> SimTime;

    /// Number of ticks in one simulated second.
    fn ticks_per_second(&self) -> SimTime;

    /// Run the next pending event.
    ///
    /// Returns `Ok(false)` without changing the time when no event is
    /// pending.
    fn run_next_event(&mut self) -> Result<bool, SimError>;

    /// Remove and return everything motes wrote to their serial ports.
    fn take_serial_output(&mut self) -> Vec<SerialPacket>;
}

/// Control of a single mote.
pub trait MoteControl {
    fn id(&self) -> NodeId;

    /// Schedule the mote to boot at the given time. Only allowed once.
    fn boot_at_time(&mut self, time: SimTime) -> SimResult;

    /// Add a reading to the mote's noise trace.
    fn add_noise_trace_reading(&mut self, reading: i32) -> SimResult;

    /// Build the noise model from all readings added so far. Only allowed
    /// once and not before at least one reading was added.
    fn create_noise_model(&mut self) -> SimResult;

    fn noise_reading_count(&self) -> usize;

    /// Whether the mote has booted.
    fn is_on(&self) -> bool;
}

/// Control of the radio link graph.
pub trait RadioControl {
    /// Add (or replace) the directed link `src -> dst`.
    fn add(&mut self, src: NodeId, dst: NodeId, gain: f64) -> SimResult;

    /// Remove a link. Returns whether it existed.
    fn remove(&mut self, src: NodeId, dst: NodeId) -> bool;

    fn gain(&self, src: NodeId, dst: NodeId) -> Option<f64>;

    fn connected(&self, src: NodeId, dst: NodeId) -> bool {
        self.gain(src, dst).is_some()
    }

    fn link_count(&self) -> usize;
}
