// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::cell::Cell;

use crate::tracker::Track;
use crate::{Id, ROOT};

/// A tracker that drops all events.
///
/// Ids are still unique so that entities remain distinguishable.
pub struct DevNullTracker {
    unique_id: Cell<u64>,
}

impl DevNullTracker {
    /// Create a new [`DevNullTracker`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            unique_id: Cell::new(ROOT.0),
        }
    }
}

impl Default for DevNullTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Track for DevNullTracker {
    fn unique_id(&self) -> Id {
        let id = self.unique_id.get();
        self.unique_id.set(id + 1);
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        false
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {}

    fn create(&self, _created_by: Id, _id: Id, _name: &str) {}

    fn log(&self, _id: Id, _level: log::Level, _msg: std::fmt::Arguments) {}

    fn time(&self, _set_by: Id, _time_secs: f64) {}

    fn shutdown(&self) {}
}
