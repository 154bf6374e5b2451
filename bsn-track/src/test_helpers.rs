// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing logging output
//!
//! The aim of this module is to provide commonly-used functions that enable the
//! testing of the output that should appear from logging macros and debug
//! channels.

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

use regex::Regex;

use crate::tracker::{EntityManager, TextTracker};
use crate::{Id, Track, Tracker};

/// A tracker that keeps track events.
pub struct TestTracker {
    events: RefCell<Vec<String>>,

    unique_id: Cell<u64>,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            unique_id: Cell::new(initial_id),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        self.events.borrow_mut().push(event);
    }

    /// Return a copy of all events seen since the last clear.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let id = self.unique_id.get();
        self.unique_id.set(id + 1);
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {
        // Do nothing
    }

    fn create(&self, _created_by: Id, id: Id, name: &str) {
        self.add_event(format!("{id}: created {name}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{id}:{level}: {msg}"));
    }

    fn time(&self, set_by: Id, time_secs: f64) {
        self.add_event(format!("{set_by}: set time {time_secs:.6}s"));
    }

    fn shutdown(&self) {
        // Do nothing
    }
}

/// Initialise a [`TestTracker`] for a test
///
/// Returns both the concrete tracker (to inspect events) and the shared
/// [`Tracker`](crate::Tracker) to hand to entities.
///
/// # Arguments
///
/// * `start_id` - The ID value to be set as the starting value
///
/// # Examples
///
/// ```
/// use bsn_track::test_helpers;
///
/// let (test_tracker, tracker) = bsn_track::test_init!(10);
/// let top = bsn_track::entity::toplevel(&tracker, "top");
/// test_helpers::check_and_clear(&test_tracker, &["10: created top"]);
/// ```
#[macro_export]
macro_rules! test_init {
    ($start_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($start_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Check and clear the _log_ output
///
/// Asserts that the events seen since the start or the last time this
/// function was called match the expected regular expressions, one per event.
/// It then clears the events recorded so far.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut events = tracker.events.borrow_mut();

    println!("Checking {:?} matches {:?}", expected, *events);

    // Check that there are the same number of strings produced as expected
    assert_eq!(expected.len(), events.len());

    for (i, (log_expect, actual)) in expected.iter().zip(events.iter()).enumerate() {
        let re = Regex::new(log_expect).unwrap();
        println!("Checking {i}: {log_expect:?} matches {actual:?}");
        assert!(re.is_match(actual));
    }

    events.clear();
}

/// Create a quiet tracker for a test.
///
/// Only errors are printed (to stdout, where the test harness captures them)
/// so that failing tests still show what went wrong.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    let mut entity_manager = EntityManager::new(log::Level::Error);
    if let Ok(regex) = std::env::var("BSN_TEST_LOG_REGEX") {
        // Allow a single test file to be debugged without recompiling
        if full_filepath.contains(&regex) {
            entity_manager = EntityManager::new(log::Level::Trace);
        }
    }
    Rc::new(TextTracker::new(entity_manager, Box::new(io::stdout())))
}

/// A writer that keeps everything written to it so that tests can check it.
///
/// Clones share the same buffer.
#[derive(Clone, Default)]
pub struct CaptureWriter {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl CaptureWriter {
    /// Create an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as text.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }

    /// Everything written so far, split into lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
