// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Run the TinyBSN application on five simulated motes.
//!
//! See `lib.rs` for details.

use bsn_app::{BsnParams, tinybsn_factory};
use bsn_config::DriverConfig;
use bsn_engine::engine::{Engine, EngineConfig};
use bsn_engine::traits::Simulator;
use bsn_engine::types::SimError;
use bsn_sim::driver::Driver;
use bsn_sim::settings::DriverSettings;
use bsn_track::builder::{TrackerConfig, build_stdout_tracker};
use bsn_track::{error, info};

fn main() -> Result<(), SimError> {
    let config = DriverConfig::parse_all_sources().map_err(|e| SimError(e.to_string()))?;

    let filter_regex = config.log_filter_regex.clone().unwrap_or_default();
    let tracker_config = TrackerConfig {
        level: config.log_level.unwrap_or(bsn_track::log::Level::Info),
        filter_regex: &filter_regex,
    };
    let tracker = build_stdout_tracker(&tracker_config).map_err(SimError)?;

    let engine_config = EngineConfig {
        seed: config.seed.unwrap_or(1),
        ..EngineConfig::default()
    };
    let engine = Engine::new(&tracker, engine_config)
        .with_application(tinybsn_factory(BsnParams::default()));
    let top = engine.top().clone();

    let settings = DriverSettings::from(&config);
    info!(top ;
        "{} motes for {}s, forwarding {}, throttle {}",
        settings.num_nodes,
        settings.run_seconds,
        settings.forward,
        settings.throttle
    );

    let mut driver = Driver::new(&top, engine, settings);
    let result = driver.run();
    driver.simulator().shutdown();

    match result {
        Ok(report) => {
            let stats = driver.simulator().statistics();
            info!(top ;
                "{} events, {} packets sent, {} received, {} lost, {} serial packets forwarded",
                report.events_run,
                stats.packets_sent,
                stats.receptions,
                stats.receptions_lost,
                report.forwarded
            );
            if report.exhausted {
                info!(top ; "Simulation ran out of events at tick {}", driver.simulator().time());
            }
            Ok(())
        }
        Err(e) => {
            error!(top ; "{e}");
            tracker.shutdown();
            Err(e)
        }
    }
}
