// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! CSMA medium access parameters.
//!
//! The defaults model a CC2420-class radio: 250 kbps (65536 symbols/s of
//! 4 bits), a 12 symbol preamble, and an initial random backoff of 20 to 400
//! symbols before transmitting.

use rand::Rng;

use crate::types::SimTime;

/// Bytes added to every radio payload by the link layer.
pub const HEADER_BYTES: usize = 11;

#[derive(Clone, Debug, PartialEq)]
pub struct Mac {
    pub init_high: u32,
    pub init_low: u32,
    pub symbols_per_sec: u32,
    pub bits_per_symbol: u32,
    pub preamble_length: u32,
    pub rx_tx_delay: u32,
}

impl Default for Mac {
    fn default() -> Self {
        Self {
            init_high: 400,
            init_low: 20,
            symbols_per_sec: 65536,
            bits_per_symbol: 4,
            preamble_length: 12,
            rx_tx_delay: 32,
        }
    }
}

impl Mac {
    fn symbols_to_ticks(&self, symbols: u64, ticks_per_second: SimTime) -> SimTime {
        symbols * ticks_per_second / u64::from(self.symbols_per_sec)
    }

    /// Time on air of a frame carrying `payload_bytes`.
    #[must_use]
    pub fn airtime_ticks(&self, payload_bytes: usize, ticks_per_second: SimTime) -> SimTime {
        let bits = ((HEADER_BYTES + payload_bytes) * 8) as u64;
        let symbols = u64::from(self.preamble_length)
            + bits.div_ceil(u64::from(self.bits_per_symbol))
            + u64::from(self.rx_tx_delay);
        self.symbols_to_ticks(symbols, ticks_per_second)
    }

    /// Random backoff before the first transmission attempt.
    pub fn initial_backoff_ticks<R: Rng>(&self, rng: &mut R, ticks_per_second: SimTime) -> SimTime {
        let symbols = rng.gen_range(self.init_low..=self.init_high);
        self.symbols_to_ticks(u64::from(symbols), ticks_per_second)
    }
}
