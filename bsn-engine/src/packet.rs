// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Packets exchanged over the simulated radio and serial port.

use crate::types::NodeId;

/// Default active message group.
pub const DEFAULT_AM_GROUP: u8 = 0x22;

/// Dispatch byte of an active message on the serial line.
pub const SERIAL_AM_DISPATCH: u8 = 0x00;

/// Bytes in front of the payload in an encoded serial frame.
pub const SERIAL_HEADER_BYTES: usize = 8;

/// Largest payload an active message can carry.
pub const MAX_PAYLOAD_BYTES: usize = 255;

/// An active message sent over the radio.
#[derive(Clone, Debug, PartialEq)]
pub struct AmPacket {
    pub src: NodeId,
    pub dest: NodeId,
    pub am_type: u8,
    pub payload: Vec<u8>,
}

/// An active message written by a mote to its serial port.
#[derive(Clone, Debug, PartialEq)]
pub struct SerialPacket {
    pub src: NodeId,
    pub dest: NodeId,
    pub am_type: u8,
    pub group: u8,
    pub payload: Vec<u8>,
}

impl SerialPacket {
    /// Encode as a serial active message frame:
    /// `[dispatch, dest(2), src(2), length, group, type, payload..]`, with
    /// multi-byte fields in network byte order.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(SERIAL_HEADER_BYTES + self.payload.len());
        frame.push(SERIAL_AM_DISPATCH);
        frame.extend_from_slice(&self.dest.to_be_bytes());
        frame.extend_from_slice(&self.src.to_be_bytes());
        frame.push(self.payload.len() as u8);
        frame.push(self.group);
        frame.push(self.am_type);
        frame.extend_from_slice(&self.payload);
        frame
    }
}
