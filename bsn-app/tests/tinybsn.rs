// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use bsn_app::msg::{AM_TEST_SERIAL_MSG, TestSerialMsg};
use bsn_app::{BsnParams, tinybsn_factory};
use bsn_engine::engine::Engine;
use bsn_engine::test_helpers::start_test_with_app;
use bsn_engine::time::secs_to_ticks;
use bsn_engine::traits::Simulator;
use bsn_track::shared;
use bsn_track::test_helpers::CaptureWriter;

struct Network {
    engine: Engine,
    app_out: CaptureWriter,
    warn: CaptureWriter,
}

/// A star network around the central node. Only the motes in `booted` are
/// switched on.
fn star_network(booted: &[u16]) -> Network {
    network(booted, -50.0)
}

/// A star network where the central node transmits to each peripheral node
/// with `downlink_gain` dB.
fn network(booted: &[u16], downlink_gain: f64) -> Network {
    let mut engine = start_test_with_app(file!(), tinybsn_factory(BsnParams::default()));
    let app_out = CaptureWriter::new();
    let warn = CaptureWriter::new();
    engine.add_channel("app_out", shared(Box::new(app_out.clone())));
    engine.add_channel("warn", shared(Box::new(warn.clone())));
    engine.init().unwrap();

    for pn in 1..5 {
        engine.radio().add(0, pn, downlink_gain).unwrap();
        engine.radio().add(pn, 0, -50.0).unwrap();
    }
    for id in booted {
        engine.node(*id).unwrap().boot_at_time(0).unwrap();
    }

    Network {
        engine,
        app_out,
        warn,
    }
}

fn run_for_secs(engine: &mut Engine, secs: f64) {
    let end = secs_to_ticks(secs, engine.ticks_per_second());
    engine.run_until(end).unwrap();
}

#[test]
fn rounds_are_decided() {
    let mut net = star_network(&[0, 1, 2, 3, 4]);
    run_for_secs(&mut net.engine, 25.0);

    let lines = net.app_out.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("DEBUG (0): round 1 decision: "));
    assert!(lines[1].starts_with("DEBUG (0): round 2 decision: "));
    assert!(net.warn.lines().is_empty());

    let reports = net.engine.take_serial_output();
    assert_eq!(reports.len(), 2);
    for report in reports {
        assert_eq!(report.src, 0);
        assert_eq!(report.am_type, AM_TEST_SERIAL_MSG);
        let value = TestSerialMsg::decode(&report.payload).unwrap().sample_value;
        assert!((1..=3).contains(&value));
    }
}

#[test]
fn missing_peripheral_aborts_round() {
    let mut net = star_network(&[0, 1, 2, 3]);
    run_for_secs(&mut net.engine, 30.0);

    assert!(net.app_out.lines().is_empty());
    assert_eq!(
        net.warn.lines(),
        vec!["DEBUG (0): round 1 aborted with 3/4 classifications"]
    );
    assert!(net.engine.take_serial_output().is_empty());
}

#[test]
fn runs_are_reproducible() {
    let mut first = star_network(&[0, 1, 2, 3, 4]);
    let mut second = star_network(&[0, 1, 2, 3, 4]);
    run_for_secs(&mut first.engine, 60.0);
    run_for_secs(&mut second.engine, 60.0);

    assert!(!first.app_out.lines().is_empty());
    assert_eq!(first.app_out.lines(), second.app_out.lines());
}

#[test]
fn unheard_requests_keep_rounds_going() {
    let mut net = network(&[0, 1, 2, 3, 4], -200.0);
    let end = secs_to_ticks(40.0, net.engine.ticks_per_second());
    net.engine.run_until(end).unwrap();

    assert!(net.app_out.lines().is_empty());
    assert_eq!(
        net.warn.lines(),
        vec![
            "DEBUG (0): round 1 aborted with 0/4 classifications",
            "DEBUG (0): round 2 aborted with 0/4 classifications",
        ]
    );
    // The next request guard is still pending
    assert!(net.engine.pending_events() > 0);
}
