// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Directed radio link graph.
//!
//! Each link carries a gain in dB. A packet sent by `src` reaches `dst` if
//! there is a link and the received signal (transmit power plus gain) beats
//! the destination's noise by at least the receive threshold.

use std::collections::BTreeMap;
use std::rc::Rc;

use bsn_track::entity::Entity;
use bsn_track::{debug, warn};

use crate::sim_error;
use crate::traits::RadioControl;
use crate::types::{NodeId, SimResult};

/// Minimum signal-to-noise ratio in dB for a packet to be received.
pub const THRESHOLD_DB: f64 = 4.0;

/// Transmit power in dBm.
pub const TX_POWER_DBM: f64 = 0.0;

pub struct Radio {
    pub entity: Rc<Entity>,
    links: BTreeMap<(NodeId, NodeId), f64>,
}

impl Radio {
    #[must_use]
    pub fn new(parent: &Rc<Entity>) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "radio")),
            links: BTreeMap::new(),
        }
    }

    /// All links leaving `src` as `(dst, gain)` pairs in destination order.
    pub fn links_from(&self, src: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.links
            .range((src, NodeId::MIN)..=(src, NodeId::MAX))
            .map(|(&(_, dst), &gain)| (dst, gain))
    }

    /// Whether a signal over a link with `gain` is heard above `noise_dbm`.
    #[must_use]
    pub fn is_received(&self, gain: f64, noise_dbm: i32) -> bool {
        TX_POWER_DBM + gain - f64::from(noise_dbm) >= THRESHOLD_DB
    }
}

impl RadioControl for Radio {
    fn add(&mut self, src: NodeId, dst: NodeId, gain: f64) -> SimResult {
        if !gain.is_finite() {
            return sim_error!("gain {gain} of link {src} -> {dst} is not a finite number");
        }
        if let Some(previous) = self.links.insert((src, dst), gain) {
            warn!(self.entity ; "link {src} -> {dst} gain changed from {previous} to {gain} dB");
        } else {
            debug!(self.entity ; "link {src} -> {dst} added with gain {gain} dB");
        }
        Ok(())
    }

    fn remove(&mut self, src: NodeId, dst: NodeId) -> bool {
        self.links.remove(&(src, dst)).is_some()
    }

    fn gain(&self, src: NodeId, dst: NodeId) -> Option<f64> {
        self.links.get(&(src, dst)).copied()
    }

    fn link_count(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use bsn_track::entity::toplevel;
    use bsn_track::tracker::dev_null_tracker;

    use super::*;

    #[test]
    fn directed_links() {
        let top = toplevel(&dev_null_tracker(), "top");
        let mut radio = Radio::new(&top);
        radio.add(0, 1, -10.5).unwrap();
        radio.add(1, 2, 3.2).unwrap();
        radio.add(0, 3, -60.0).unwrap();

        assert!(radio.connected(0, 1));
        assert!(!radio.connected(1, 0));
        assert_eq!(radio.gain(1, 2), Some(3.2));
        assert_eq!(radio.links_from(0).collect::<Vec<_>>(), vec![(1, -10.5), (3, -60.0)]);

        // Re-adding overwrites the gain
        radio.add(0, 1, -20.0).unwrap();
        assert_eq!(radio.link_count(), 3);
        assert_eq!(radio.gain(0, 1), Some(-20.0));

        assert!(radio.remove(0, 1));
        assert!(!radio.connected(0, 1));
    }

    #[test]
    fn reject_nan_gain() {
        let top = toplevel(&dev_null_tracker(), "top");
        let mut radio = Radio::new(&top);
        assert!(radio.add(0, 1, f64::NAN).is_err());
    }

    #[test]
    fn reception_threshold() {
        let top = toplevel(&dev_null_tracker(), "top");
        let radio = Radio::new(&top);
        assert!(radio.is_received(-60.0, -98));
        assert!(radio.is_received(-94.0, -98));
        assert!(!radio.is_received(-95.0, -98));
    }
}
