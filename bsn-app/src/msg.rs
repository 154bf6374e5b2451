// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Messages exchanged by TinyBSN motes.
//!
//! All multi-byte fields are in network byte order.

use std::fmt;

use bsn_engine::sim_error;
use bsn_engine::types::SimError;

/// Active message type of [`BsnMsg`] on the radio.
pub const AM_BSN_MSG: u8 = 6;

/// Active message type of [`TestSerialMsg`] on the serial port.
pub const AM_TEST_SERIAL_MSG: u8 = 0x89;

pub const BSN_MSG_BYTES: usize = 4;
pub const TEST_SERIAL_MSG_BYTES: usize = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MsgType {
    /// Central node asks for a classification.
    Req = 1,
    /// Peripheral node answers with a classification.
    Res = 2,
}

impl TryFrom<u8> for MsgType {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Req),
            2 => Ok(Self::Res),
            other => sim_error!("unknown message type {other}"),
        }
    }
}

/// The value carried by a message. Classifications are ordered by severity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Activity {
    Start = 0,
    NoMovement = 1,
    Movement = 2,
    Crisis = 3,
}

impl TryFrom<u8> for Activity {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Start),
            1 => Ok(Self::NoMovement),
            2 => Ok(Self::Movement),
            3 => Ok(Self::Crisis),
            other => sim_error!("unknown message value {other}"),
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::NoMovement => "NO_MOVEMENT",
            Self::Movement => "MOVEMENT",
            Self::Crisis => "CRISIS",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BsnMsg {
    pub msg_type: MsgType,
    pub msg_id: u16,
    pub value: Activity,
}

impl BsnMsg {
    #[must_use]
    pub fn request(msg_id: u16) -> Self {
        Self {
            msg_type: MsgType::Req,
            msg_id,
            value: Activity::Start,
        }
    }

    #[must_use]
    pub fn response(msg_id: u16, value: Activity) -> Self {
        Self {
            msg_type: MsgType::Res,
            msg_id,
            value,
        }
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let id = self.msg_id.to_be_bytes();
        vec![self.msg_type as u8, id[0], id[1], self.value as u8]
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SimError> {
        if bytes.len() != BSN_MSG_BYTES {
            return sim_error!(
                "bsn_msg must be {BSN_MSG_BYTES} bytes, received {}",
                bytes.len()
            );
        }
        Ok(Self {
            msg_type: MsgType::try_from(bytes[0])?,
            msg_id: u16::from_be_bytes([bytes[1], bytes[2]]),
            value: Activity::try_from(bytes[3])?,
        })
    }
}

/// Report written to the serial port by the central node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TestSerialMsg {
    pub sample_value: u16,
}

impl TestSerialMsg {
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.sample_value.to_be_bytes().to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SimError> {
        match bytes {
            [high, low] => Ok(Self {
                sample_value: u16::from_be_bytes([*high, *low]),
            }),
            _ => sim_error!(
                "test_serial_msg must be {TEST_SERIAL_MSG_BYTES} bytes, received {}",
                bytes.len()
            ),
        }
    }
}
