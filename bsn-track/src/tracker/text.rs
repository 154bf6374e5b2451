// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::cell::{Cell, RefCell};
use std::io::Write;

use crate::tracker::{EntityManager, Track};
use crate::{Id, Writer};

/// A simple text logger to output messages to a Writer.
///
/// Write failures are ignored.
pub struct TextTracker {
    entity_manager: EntityManager,

    /// Writer to which all _log_ events will be written.
    writer: RefCell<Writer>,

    /// Last simulated time seen, prefixed to every message.
    time_secs: Cell<f64>,
}

impl TextTracker {
    /// Create a new [`TextTracker`] with an [`EntityManager`].
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            writer: RefCell::new(writer),
            time_secs: Cell::new(0.0),
        }
    }

    fn write_line(&self, line: std::fmt::Arguments) {
        let _ = writeln!(self.writer.borrow_mut(), "{line}");
    }
}

/// Implementation for each [`Track`] event
impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_enabled(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
    }

    fn create(&self, created_by: Id, _id: Id, name: &str) {
        let by = self.entity_manager.name_of(created_by);
        self.write_line(format_args!("{by}: created {name}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        let name = self.entity_manager.name_of(id);
        let time_secs = self.time_secs.get();
        self.write_line(format_args!("{time_secs:.3}s {name}:{level}: {msg}"));
    }

    fn time(&self, _set_by: Id, time_secs: f64) {
        self.time_secs.set(time_secs);
    }

    fn shutdown(&self) {
        let _ = self.writer.borrow_mut().flush();
    }
}
