// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

/// Address of a mote.
pub type NodeId = u16;

/// Simulated time in engine ticks.
pub type SimTime = u64;

/// Destination address that reaches every linked mote.
pub const BROADCAST_ADDR: NodeId = 0xffff;

// Simulation errors

#[macro_export]
/// Build an `Err(SimError)` from format arguments.
macro_rules! sim_error {
    ($($arg:tt)+) => {
        Err($crate::types::SimError(format!($($arg)+)))
    };
}

/// The `SimError` is what should be returned in the case of an error
#[derive(Debug, PartialEq)]
pub struct SimError(pub String);

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl Error for SimError {}

/// The SimResult is the return type for most simulation functions
pub type SimResult = Result<(), SimError>;
