// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use bsn_track::test_helpers::create_tracker;

use crate::app::AppFactory;
use crate::engine::{Engine, EngineConfig};

#[must_use]
pub fn start_test(full_filepath: &str) -> Engine {
    Engine::new(&create_tracker(full_filepath), EngineConfig::default())
}

/// Start a test engine whose motes all run the application built by `factory`.
#[must_use]
pub fn start_test_with_app(full_filepath: &str, factory: AppFactory) -> Engine {
    start_test(full_filepath).with_application(factory)
}
