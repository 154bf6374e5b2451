// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Library functions to build trackers as defined by the user.

use std::io;
use std::rc::Rc;

use crate::tracker::{EntityManager, TextTracker};
use crate::{Tracker, Writer};

/// Configuration options for a text tracker.
pub struct TrackerConfig<'a> {
    /// Set the level at which this tracker should be enabled.
    pub level: log::Level,

    /// A regular expression to match which entities should have this level
    /// applied. All others only emit errors. An empty string matches all
    /// entities.
    pub filter_regex: &'a str,
}

impl Default for TrackerConfig<'_> {
    fn default() -> Self {
        Self {
            level: log::Level::Info,
            filter_regex: "",
        }
    }
}

/// Create a text tracker writing to the given writer.
pub fn build_text_tracker(config: &TrackerConfig, writer: Writer) -> Result<Tracker, String> {
    let default_level = if config.filter_regex.is_empty() {
        config.level
    } else {
        log::Level::Error
    };

    let mut entity_manager = EntityManager::new(default_level);
    if !config.filter_regex.is_empty() {
        entity_manager.add_log_filter(config.filter_regex, config.level)?;
    }

    Ok(Rc::new(TextTracker::new(entity_manager, writer)))
}

/// Create a tracker that prints to stdout.
pub fn build_stdout_tracker(config: &TrackerConfig) -> Result<Tracker, String> {
    build_text_tracker(config, Box::new(io::stdout()))
}
