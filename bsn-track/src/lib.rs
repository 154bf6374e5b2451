// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! This module provides the _track_ capabilities for the BSN simulator.
//!
//! _Track_ covers two kinds of human-readable output:
//!
//!   - _log_ messages emitted by simulation [`Entities`](crate::entity::Entity)
//!     at various levels of verbosity (from `Trace` through to `Error`) and
//!     filtered per entity.
//!   - _debug channels_, the named output streams ("main", "app_out", ...)
//!     that simulated motes write to. See [`channel`].

// Enable warnings for missing documentation
#![warn(missing_docs)]

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use log;

pub mod builder;
pub mod channel;
pub mod entity;
pub mod test_helpers;

/// Include the trackers.
pub mod tracker;
pub use tracker::{Track, Tracker};

/// A type alias for objects that receive _log_ or channel output.
pub type Writer = Box<dyn std::io::Write>;

/// A [`Writer`] that can be shared by several owners.
pub type SharedWriter = Rc<RefCell<Writer>>;

#[must_use]
pub fn shared(writer: Writer) -> SharedWriter {
    Rc::new(RefCell::new(writer))
}

/// Unique identifier given to each entity.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Id(pub u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id value which indicates where there is no valid entity
pub const NO_ID: Id = Id(0);

/// The root id from which all other ids are derived
pub const ROOT: Id = Id(1);

/// Add an entity creation event
#[macro_export]
macro_rules! create {
    ($entity:expr) => {{
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            let parent_id = match &$entity.parent {
                Some(parent) => parent.id,
                None => $crate::NO_ID,
            };
            $entity
                .tracker
                .create(parent_id, $entity.id, $entity.full_name().as_str());
        }
    }};
}

/// Update the current simulated time (in seconds).
#[macro_export]
macro_rules! set_time {
    ($entity:expr ; $time_secs:expr) => {{
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            $entity.tracker.time($entity.id, $time_secs);
        }
    }};
}

/// Base macro for log messages of all level.
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $lvl:expr, $($arg:tt)+) => (
        if $entity.tracker.is_entity_enabled($entity.id, $lvl) {
            $entity.tracker.log($entity.id, $lvl, format_args!($($arg)+));
        }
    );
}

/// Log at level `log::Level::Trace`
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+);
    );
}

/// Log at level `log::Level::Debug`
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+);
    );
}

/// Log at level `log::Level::Info`
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+);
    );
}

/// Log at level `log::Level::Warn`
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+);
    );
}

/// Log at level `log::Level::Error`
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+);
    );
}
