// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! TinyBSN: a body sensor network application for simulated motes.
//!
//! One central node (CN) periodically asks the peripheral nodes (PNs) to
//! classify the wearer's activity. Each PN acquires a buffer of accelerometer
//! samples, classifies it by its standard deviation and answers the CN. Once
//! every PN has answered the CN takes a majority decision and reports it on
//! the `app_out` debug channel and over its serial port.
//!
//! # Debug channels
//!
//!  - `main`: boot messages.
//!  - `info`: requests and responses.
//!  - `warn`: timeouts and undecodable messages.
//!  - `app_out`: the CN's decisions.

use bsn_engine::app::AppFactory;
use bsn_engine::types::NodeId;

pub mod central;
pub mod classify;
pub mod msg;
pub mod peripheral;

use central::CentralNode;
use peripheral::PeripheralNode;

/// Timing and network size of a TinyBSN deployment. Durations are in
/// milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct BsnParams {
    pub central_id: NodeId,
    pub n_pns: usize,
    pub buf_size: usize,
    pub f_acq_ms: u64,
    pub pn_timeout_ms: u64,
    pub cn_timeout_ms: u64,
    pub start_delay_ms: u64,
    pub round_pause_ms: u64,
}

impl Default for BsnParams {
    fn default() -> Self {
        Self {
            central_id: 0,
            n_pns: 4,
            buf_size: 200,
            f_acq_ms: 50,
            pn_timeout_ms: 15_000,
            cn_timeout_ms: 15_000,
            start_delay_ms: 500,
            round_pause_ms: 1_000,
        }
    }
}

/// Build the firmware for every mote: the central node runs
/// [`CentralNode`], all others run [`PeripheralNode`].
#[must_use]
pub fn tinybsn_factory(params: BsnParams) -> AppFactory {
    Box::new(move |id| {
        if id == params.central_id {
            Box::new(CentralNode::new(params.clone()))
        } else {
            Box::new(PeripheralNode::new(params.clone()))
        }
    })
}
