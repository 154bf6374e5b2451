// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::collections::BTreeMap;
use std::fs;
use std::rc::Rc;

use bsn_engine::mac::Mac;
use bsn_engine::packet::{DEFAULT_AM_GROUP, SerialPacket};
use bsn_engine::sim_error;
use bsn_engine::traits::{MoteControl, RadioControl, Simulator};
use bsn_engine::types::{BROADCAST_ADDR, NodeId, SimError, SimResult, SimTime};
use bsn_sim::settings::DriverSettings;
use bsn_track::SharedWriter;
use bsn_track::entity::{Entity, toplevel};
use bsn_track::test_helpers::create_tracker;
use tempfile::TempDir;

/// Everything the driver did to one mote.
#[derive(Default)]
pub struct MockNode {
    pub boots: Vec<SimTime>,
    pub readings: Vec<i32>,
    pub models_created: usize,
}

#[derive(Default)]
pub struct MockRadio {
    pub links: Vec<(NodeId, NodeId, f64)>,
}

impl RadioControl for MockRadio {
    fn add(&mut self, src: NodeId, dst: NodeId, gain: f64) -> SimResult {
        self.links.push((src, dst, gain));
        Ok(())
    }

    fn remove(&mut self, src: NodeId, dst: NodeId) -> bool {
        let before = self.links.len();
        self.links.retain(|(s, d, _)| !(*s == src && *d == dst));
        self.links.len() != before
    }

    fn gain(&self, src: NodeId, dst: NodeId) -> Option<f64> {
        self.links
            .iter()
            .rev()
            .find(|(s, d, _)| *s == src && *d == dst)
            .map(|(_, _, gain)| *gain)
    }

    fn link_count(&self) -> usize {
        self.links.len()
    }
}

struct MockMote<'a> {
    id: NodeId,
    node: &'a mut MockNode,
}

impl MoteControl for MockMote<'_> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn boot_at_time(&mut self, time: SimTime) -> SimResult {
        self.node.boots.push(time);
        Ok(())
    }

    fn add_noise_trace_reading(&mut self, reading: i32) -> SimResult {
        self.node.readings.push(reading);
        Ok(())
    }

    fn create_noise_model(&mut self) -> SimResult {
        self.node.models_created += 1;
        Ok(())
    }

    fn noise_reading_count(&self) -> usize {
        self.node.readings.len()
    }

    fn is_on(&self) -> bool {
        !self.node.boots.is_empty()
    }
}

/// A simulator whose every event advances time by a fixed step. It records
/// all configuration calls.
pub struct MockSimulator {
    pub ticks_per_second: SimTime,
    pub step: SimTime,
    /// Report exhaustion after this many events.
    pub event_limit: Option<u64>,
    /// Write a serial packet every this many events.
    pub serial_every: Option<u64>,
    pub time: SimTime,
    pub initialized: bool,
    pub events_run: u64,
    pub nodes: BTreeMap<NodeId, MockNode>,
    pub radio: MockRadio,
    pub channels: Vec<String>,
    mac: Mac,
    serial: Vec<SerialPacket>,
}

impl MockSimulator {
    pub fn new(ticks_per_second: SimTime, step: SimTime) -> Self {
        Self {
            ticks_per_second,
            step,
            event_limit: None,
            serial_every: None,
            time: 0,
            initialized: false,
            events_run: 0,
            nodes: BTreeMap::new(),
            radio: MockRadio::default(),
            channels: Vec::new(),
            mac: Mac::default(),
            serial: Vec::new(),
        }
    }
}

impl Simulator for MockSimulator {
    fn init(&mut self) -> SimResult {
        if self.initialized {
            return sim_error!("mock initialized twice");
        }
        self.initialized = true;
        Ok(())
    }

    fn mac(&self) -> &Mac {
        &self.mac
    }

    fn radio(&mut self) -> &mut dyn RadioControl {
        &mut self.radio
    }

    fn node(&mut self, id: NodeId) -> Result<Box<dyn MoteControl + '_>, SimError> {
        let node = self.nodes.entry(id).or_default();
        Ok(Box::new(MockMote { id, node }))
    }

    fn add_channel(&mut self, channel: &str, _writer: SharedWriter) {
        self.channels.push(channel.to_string());
    }

    fn time(&self) -> SimTime {
        self.time
    }

    fn ticks_per_second(&self) -> SimTime {
        self.ticks_per_second
    }

    fn run_next_event(&mut self) -> Result<bool, SimError> {
        if !self.initialized {
            return sim_error!("mock not initialized");
        }
        if self.event_limit.is_some_and(|limit| self.events_run >= limit) {
            return Ok(false);
        }
        self.time += self.step;
        self.events_run += 1;
        if self
            .serial_every
            .is_some_and(|every| self.events_run % every == 0)
        {
            self.serial.push(SerialPacket {
                src: 0,
                dest: BROADCAST_ADDR,
                am_type: 0x89,
                group: DEFAULT_AM_GROUP,
                payload: vec![0, 1],
            });
        }
        Ok(true)
    }

    fn take_serial_output(&mut self) -> Vec<SerialPacket> {
        std::mem::take(&mut self.serial)
    }
}

/// The input files of a run, kept alive for as long as the directory.
pub struct Inputs {
    pub dir: TempDir,
    pub settings: DriverSettings,
}

/// Write the topology and noise files and build settings that use them with
/// the forwarder and throttle disabled.
pub fn inputs(topology: &str, noise: &str) -> Inputs {
    let dir = TempDir::new().unwrap();
    let topology_file = dir.path().join("topology.txt");
    let noise_file = dir.path().join("noise.txt");
    fs::write(&topology_file, topology).unwrap();
    fs::write(&noise_file, noise).unwrap();

    let settings = DriverSettings {
        topology_file,
        noise_file,
        forward: false,
        throttle: false,
        ..DriverSettings::default()
    };
    Inputs { dir, settings }
}

/// Noise trace with `lines` readings.
pub fn noise_lines(lines: usize) -> String {
    (0..lines).map(|i| format!("{}\n", -90 - (i % 8) as i32)).collect()
}

pub fn test_top(path: &str) -> Rc<Entity> {
    toplevel(&create_tracker(path), "top")
}
