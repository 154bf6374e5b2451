// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Define the [`Track`] trait and a number of [`Tracker`]s.

/// Include the /dev/null tracker.
pub mod dev_null;
/// Include the text-based tracker.
pub mod text;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub use dev_null::DevNullTracker;
use regex::Regex;
pub use text::TextTracker;

use crate::{Id, ROOT};

/// This is the interface that is supported by all [`Tracker`]s.
pub trait Track {
    /// Allocate a new unique id.
    fn unique_id(&self) -> Id;

    /// Determine whether the entity is enabled at the given level.
    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool;

    /// Register an entity with its full hierarchical name.
    fn add_entity(&self, id: Id, entity_name: &str);

    /// Track when an entity is created.
    fn create(&self, created_by: Id, id: Id, name: &str);

    /// Track a log message of the given level.
    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments);

    /// Advance the time to the simulated time specified in seconds.
    fn time(&self, set_by: Id, time_secs: f64);

    /// Flush any buffered output.
    fn shutdown(&self);
}

/// The type of a [`Tracker`] that is shared across entities.
pub type Tracker = Rc<dyn Track>;

/// Create a [`Tracker`] that prints all events at `Warn` and above to
/// `stdout`.
pub fn stdout_tracker() -> Tracker {
    let entity_manager = EntityManager::new(log::Level::Warn);
    let stdout_writer = Box::new(std::io::stdout());
    Rc::new(TextTracker::new(entity_manager, stdout_writer))
}

/// Create a [`Tracker`] that suppresses all track events.
pub fn dev_null_tracker() -> Tracker {
    Rc::new(DevNullTracker::new())
}

/// The [`EntityManager`] is responsible for determining entity log levels.
///
/// This manager is also used to allocate unique [`Id`] values.
pub struct EntityManager {
    /// Level of _log_ events to output when no filter matches.
    default_log_level: log::Level,

    /// List of regular expressions mapping entity names to log levels.
    regex_to_log_level: Vec<(Regex, log::Level)>,

    /// Resolved level of each registered entity.
    entity_levels: RefCell<HashMap<Id, log::Level>>,

    /// Full name of each registered entity.
    entity_names: RefCell<HashMap<Id, String>>,

    /// Used to assign unique ids.
    unique_id: Cell<u64>,
}

impl EntityManager {
    /// Constructor with a default [`log::Level`]
    #[must_use]
    pub fn new(default_log_level: log::Level) -> Self {
        Self {
            default_log_level,
            regex_to_log_level: Vec::new(),
            entity_levels: RefCell::new(HashMap::new()),
            entity_names: RefCell::new(HashMap::new()),
            unique_id: Cell::new(ROOT.0),
        }
    }

    /// Add a log filter regular expression.
    ///
    /// Entities whose full name matches the expression log at `level`. The
    /// first matching filter wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bsn_track::tracker::EntityManager;
    /// let mut manager = EntityManager::new(log::Level::Warn);
    /// manager.add_log_filter(".*node0.*", log::Level::Trace).unwrap();
    /// ```
    pub fn add_log_filter(&mut self, regex_str: &str, level: log::Level) -> Result<(), String> {
        let regex = Regex::new(regex_str)
            .map_err(|e| format!("Failed to parse regex {regex_str}:\n{e}\n"))?;
        self.regex_to_log_level.push((regex, level));
        Ok(())
    }

    pub(crate) fn unique_id(&self) -> Id {
        let id = self.unique_id.get();
        self.unique_id.set(id + 1);
        Id(id)
    }

    fn log_level_for(&self, entity_name: &str) -> log::Level {
        for (regex, level) in self.regex_to_log_level.iter() {
            if regex.is_match(entity_name) {
                return *level;
            }
        }
        self.default_log_level
    }

    pub(crate) fn add_entity(&self, id: Id, entity_name: &str) {
        let level = self.log_level_for(entity_name);
        self.entity_levels.borrow_mut().insert(id, level);
        self.entity_names
            .borrow_mut()
            .insert(id, entity_name.to_string());
    }

    pub(crate) fn is_enabled(&self, id: Id, level: log::Level) -> bool {
        let max_level = self
            .entity_levels
            .borrow()
            .get(&id)
            .copied()
            .unwrap_or(self.default_log_level);
        level <= max_level
    }

    pub(crate) fn name_of(&self, id: Id) -> String {
        match self.entity_names.borrow().get(&id) {
            Some(name) => name.clone(),
            None => id.to_string(),
        }
    }
}
