// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! A discrete-event simulator for networks of wireless motes.
//!
//! The [engine](crate::engine::Engine) keeps a single time-ordered queue of
//! events (mote boots, timer expiries and packet receptions). Each event is
//! handed to the [application](crate::app::Application) running on the
//! target mote, and the actions the application takes (sending packets,
//! starting timers, writing debug output) are turned into new events.
//!
//! Radio reception is decided per link: a packet is heard when the link gain
//! exceeds the receiver's sampled noise floor by the radio threshold. Noise
//! floors come from per-mote [noise models](crate::noise) built from
//! recorded traces.
//!
//! Drivers talk to the engine through the [`Simulator`](crate::traits::Simulator)
//! trait.
//!
//! # Simple Application
//!
//! ```rust
//! use bsn_engine::engine::Engine;
//! use bsn_engine::time::secs_to_ticks;
//! use bsn_engine::traits::Simulator;
//!
//! let mut engine = Engine::default();
//! engine.init().unwrap();
//! let tps = engine.ticks_per_second();
//! engine.node(0).unwrap().boot_at_time(secs_to_ticks(1.0, tps)).unwrap();
//! while engine.run_next_event().unwrap() {}
//! assert_eq!(engine.time(), tps);
//! ```

pub mod app;
pub mod engine;
pub mod event;
pub mod mac;
pub mod noise;
pub mod node;
pub mod packet;
pub mod radio;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;
