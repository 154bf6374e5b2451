// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use bsn_app::{BsnParams, tinybsn_factory};
use bsn_engine::engine::{Engine, EngineConfig};
use bsn_sim::driver::Driver;
use bsn_track::test_helpers::{CaptureWriter, create_tracker};

mod common;
use common::{inputs, noise_lines};

const STAR: &str = "\
0 1 -50.0
1 0 -50.0
0 2 -50.0
2 0 -50.0
0 3 -50.0
3 0 -50.0
0 4 -50.0
4 0 -50.0
";

fn tinybsn_engine() -> Engine {
    Engine::new(&create_tracker(file!()), EngineConfig::default())
        .with_application(tinybsn_factory(BsnParams::default()))
}

#[test]
fn decisions_reach_app_out() {
    let inputs = inputs(STAR, &noise_lines(100));
    let mut settings = inputs.settings.clone();
    settings.run_seconds = 25;

    let engine = tinybsn_engine();
    let top = engine.top().clone();
    let channels = CaptureWriter::new();
    let mut driver = Driver::new(&top, engine, settings)
        .with_console(Box::new(CaptureWriter::new()))
        .with_channel_writer(Box::new(channels.clone()));

    let report = driver.run().unwrap();

    assert_eq!(report.links, 8);
    assert!(!report.exhausted);
    let decisions: Vec<String> = channels
        .lines()
        .into_iter()
        .filter(|line| line.contains("decision"))
        .collect();
    assert_eq!(decisions.len(), 2);
    assert!(decisions[0].starts_with("DEBUG (0): round 1 decision: "));

    let stats = driver.simulator().statistics();
    assert!(stats.packets_sent >= 10);
    assert_eq!(stats.serial_packets, 2);
}

#[test]
fn empty_noise_trace_fails() {
    let inputs = inputs(STAR, "\n\n");
    let engine = tinybsn_engine();
    let top = engine.top().clone();
    let mut driver = Driver::new(&top, engine, inputs.settings.clone())
        .with_console(Box::new(CaptureWriter::new()))
        .with_channel_writer(Box::new(std::io::sink()));

    let err = driver.run().unwrap_err();
    assert!(err.0.contains("without noise readings"), "{err}");
}
