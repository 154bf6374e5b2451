// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use bsn_engine::time::TICKS_PER_SECOND;
use bsn_engine::traits::Simulator;
use bsn_sim::driver::Driver;
use bsn_track::test_helpers::CaptureWriter;

mod common;
use common::{MockSimulator, inputs, noise_lines, test_top};

const TOPOLOGY: &str = "0 1 -10.5\n1 2 3.2\n\n";

fn mock_driver(
    sim: MockSimulator,
    settings: bsn_sim::settings::DriverSettings,
) -> (Driver<MockSimulator>, CaptureWriter) {
    let console = CaptureWriter::new();
    let driver = Driver::new(&test_top(file!()), sim, settings)
        .with_console(Box::new(console.clone()))
        .with_channel_writer(Box::new(std::io::sink()));
    (driver, console)
}

#[test]
fn blank_topology_lines_add_no_links() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    let report = driver.run().unwrap();

    assert_eq!(report.links, 2);
    assert_eq!(
        driver.simulator().radio.links,
        vec![(0, 1, -10.5), (1, 2, 3.2)]
    );
}

#[test]
fn noise_samples_capped() {
    let inputs = inputs(TOPOLOGY, &noise_lines(12_000));
    let (mut driver, console) =
        mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    let report = driver.run().unwrap();

    assert_eq!(report.noise_samples, 10_000);
    assert_eq!(report.noise_samples_skipped, 2_000);
    let sim = driver.simulator();
    assert_eq!(sim.nodes.len(), 5);
    for node in sim.nodes.values() {
        assert_eq!(node.readings.len(), 10_000);
        assert_eq!(node.readings[..3], [-90, -91, -92]);
    }
    // One marker per 5000 samples
    assert!(console.contents().contains("Loading: ##Done!"));
}

#[test]
fn loop_stops_after_time_bound() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    let report = driver.run().unwrap();

    // Events run at 0, 100, .., 13000 and the last one moves time past the
    // bound of 130 * 100 ticks
    assert_eq!(report.events_run, 131);
    assert_eq!(report.final_time, 13_100);
    assert!(!report.exhausted);
}

#[test]
fn loop_runs_at_least_once() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let mut settings = inputs.settings.clone();
    settings.run_seconds = 0;
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 1_000), settings);

    let report = driver.run().unwrap();
    assert_eq!(report.events_run, 1);
}

#[test]
fn every_node_booted_and_modelled_once() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    driver.run().unwrap();

    let sim = driver.simulator();
    assert_eq!(sim.nodes.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    for node in sim.nodes.values() {
        assert_eq!(node.boots, vec![0]);
        assert_eq!(node.models_created, 1);
    }
}

#[test]
fn boot_time_and_node_count_configurable() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let mut settings = inputs.settings.clone();
    settings.num_nodes = 3;
    settings.boot_seconds = 2.5;
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), settings);

    driver.run().unwrap();

    let sim = driver.simulator();
    assert_eq!(sim.nodes.len(), 3);
    assert!(sim.nodes.values().all(|node| node.boots == vec![250]));
}

#[test]
fn two_field_topology_line_fails() {
    let inputs = inputs("0 1 -10.5\n1 2\n", &noise_lines(10));
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    let err = driver.run().unwrap_err();

    assert!(err.0.contains("line 2"), "{err}");
    let sim = driver.simulator();
    assert!(sim.radio.links.is_empty());
    assert_eq!(sim.events_run, 0);
}

#[test]
fn bad_noise_reading_fails() {
    let inputs = inputs(TOPOLOGY, "-98\nloud\n");
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    assert!(driver.run().is_err());
    assert!(driver.simulator().nodes.values().all(|n| n.models_created == 0));
}

#[test]
fn statistics_printed_without_services() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let (mut driver, console) =
        mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    let report = driver.run().unwrap();

    assert!(!report.throttle.initialized);
    assert_eq!(report.throttle.checks, 0);
    assert_eq!(report.forwarded, 0);
    let text = console.contents();
    assert!(text.contains("Simulation finished at 131.000s"));
    assert!(text.contains("Throttle statistics:"));
    assert!(text.contains("throttle not initialized"));
}

#[test]
fn exhausted_simulator_ends_run_early() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let mut sim = MockSimulator::new(100, 100);
    sim.event_limit = Some(10);
    let (mut driver, console) = mock_driver(sim, inputs.settings.clone());

    let report = driver.run().unwrap();

    assert!(report.exhausted);
    assert_eq!(report.events_run, 10);
    assert_eq!(report.final_time, 1_000);
    assert!(console.contents().contains("Throttle statistics:"));
}

#[test]
fn throttle_checked_after_every_event() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let mut settings = inputs.settings.clone();
    settings.throttle = true;
    settings.throttle_speed = 1.0e6;
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), settings);

    let report = driver.run().unwrap();

    assert!(report.throttle.initialized);
    assert_eq!(report.throttle.checks, report.events_run);
}

#[test]
fn channels_attached() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), inputs.settings.clone());

    driver.run().unwrap();

    assert_eq!(
        driver.simulator().channels,
        vec!["info", "main", "warn", "app_out"]
    );
}

#[test]
fn serial_output_drained_with_forwarder() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let mut settings = inputs.settings.clone();
    settings.forward = true;
    settings.forward_port = 0;
    let mut sim = MockSimulator::new(100, 100);
    sim.serial_every = Some(10);
    let (mut driver, _) = mock_driver(sim, settings);

    let report = driver.run().unwrap();

    // Nobody connected, so nothing was forwarded
    assert_eq!(report.forwarded, 0);
    assert!(driver.simulator_mut().take_serial_output().is_empty());
}

#[test]
fn missing_noise_file_fails() {
    let inputs = inputs(TOPOLOGY, "");
    let mut settings = inputs.settings.clone();
    settings.noise_file = inputs.dir.path().join("missing.txt");
    let (mut driver, _) = mock_driver(MockSimulator::new(100, 100), settings);

    let err = driver.run().unwrap_err();
    assert!(err.0.contains("missing.txt"), "{err}");
}

#[test]
fn throttle_interval_beyond_clock_fails() {
    let inputs = inputs(TOPOLOGY, &noise_lines(10));
    let mut settings = inputs.settings.clone();
    settings.throttle = true;
    settings.throttle_interval_ms = 2_000_000_000;
    let sim = MockSimulator::new(TICKS_PER_SECOND, TICKS_PER_SECOND / 10);
    let (mut driver, _) = mock_driver(sim, settings);

    let err = driver.run().unwrap_err();
    assert!(err.0.contains("throttle interval"), "{err}");
    assert_eq!(driver.simulator().events_run, 0);
}
