// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The application (firmware) interface of a simulated mote.
//!
//! Applications are event driven: the engine calls them when the mote boots,
//! when a timer fires, and when a packet is received. Handlers do not act on
//! the simulation directly, they record [`Action`]s in the [`AppContext`]
//! which the engine applies once the handler returns.

use std::fmt;

use rand::rngs::StdRng;

use crate::packet::AmPacket;
use crate::time::ms_to_ticks;
use crate::types::{NodeId, SimTime};

/// Identifies one of a mote's timers.
pub type TimerId = u8;

/// Creates the application run by each mote.
pub type AppFactory = Box<dyn Fn(NodeId) -> Box<dyn Application>>;

/// Something an application asked the engine to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// (Re)start a one-shot timer. Restarting cancels the pending expiry.
    StartTimer { timer: TimerId, delay: SimTime },
    StopTimer { timer: TimerId },
    Send { dest: NodeId, am_type: u8, payload: Vec<u8> },
    SerialSend { am_type: u8, payload: Vec<u8> },
    Debug { channel: String, message: String },
}

/// Firmware of a simulated mote.
pub trait Application {
    fn booted(&mut self, ctx: &mut AppContext);

    fn timer_fired(&mut self, ctx: &mut AppContext, timer: TimerId);

    fn received(&mut self, ctx: &mut AppContext, packet: &AmPacket);
}

pub struct AppContext<'a> {
    node: NodeId,
    now: SimTime,
    ticks_per_second: SimTime,
    rng: &'a mut StdRng,
    actions: Vec<Action>,
}

impl<'a> AppContext<'a> {
    pub fn new(node: NodeId, now: SimTime, ticks_per_second: SimTime, rng: &'a mut StdRng) -> Self {
        Self {
            node,
            now,
            ticks_per_second,
            rng,
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now * 1000 / self.ticks_per_second
    }

    /// The mote's own random number generator.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    pub fn start_timer_ms(&mut self, timer: TimerId, delay_ms: u64) {
        let delay = ms_to_ticks(delay_ms, self.ticks_per_second);
        self.actions.push(Action::StartTimer { timer, delay });
    }

    pub fn stop_timer(&mut self, timer: TimerId) {
        self.actions.push(Action::StopTimer { timer });
    }

    pub fn send(&mut self, dest: NodeId, am_type: u8, payload: Vec<u8>) {
        self.actions.push(Action::Send {
            dest,
            am_type,
            payload,
        });
    }

    pub fn serial_send(&mut self, am_type: u8, payload: Vec<u8>) {
        self.actions.push(Action::SerialSend { am_type, payload });
    }

    /// Write a message to one or more (comma-separated) debug channels.
    pub fn dbg(&mut self, channel: &str, message: fmt::Arguments) {
        self.actions.push(Action::Debug {
            channel: channel.to_string(),
            message: message.to_string(),
        });
    }

    #[must_use]
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

/// Firmware that does nothing, used when no application is installed.
pub struct IdleApplication;

impl Application for IdleApplication {
    fn booted(&mut self, _ctx: &mut AppContext) {}

    fn timer_fired(&mut self, _ctx: &mut AppContext, _timer: TimerId) {}

    fn received(&mut self, _ctx: &mut AppContext, _packet: &AmPacket) {}
}
