// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Drive a simulated body sensor network.
//!
//! The [`Driver`](crate::driver::Driver) runs a fixed checklist against any
//! [`Simulator`](bsn_engine::traits::Simulator):
//!
//!  1. initialize the simulator,
//!  2. attach the debug channels,
//!  3. schedule the boot of every mote,
//!  4. register the radio links of the [topology](crate::topology) file,
//!  5. feed the [noise trace](crate::noise_trace) to every mote,
//!  6. build the motes' noise models,
//!  7. start the [serial forwarder](crate::forwarder) and the
//!     [throttle](crate::throttle),
//!  8. step the simulation until the time bound,
//!  9. print the throttle statistics.
//!
//! All settings come from [`bsn_config::DriverConfig`] and are resolved into
//! [`DriverSettings`](crate::settings::DriverSettings).

pub mod driver;
pub mod forwarder;
pub mod noise_trace;
pub mod settings;
pub mod throttle;
pub mod topology;
