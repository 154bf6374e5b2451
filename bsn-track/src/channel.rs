// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Named debug channels.
//!
//! Simulated motes write their debug output to named channels (for example
//! `"main"` or `"app_out"`). Output is only produced for channels that have
//! had at least one [`Writer`] attached with [`Channels::add_channel`].
//!
//! A message can be sent to several channels at once by giving a
//! comma-separated list of names. A writer attached to more than one of the
//! listed channels receives the message only once.
//!
//! # Example
//!
//! ```rust
//! use bsn_track::channel::Channels;
//! use bsn_track::test_helpers::CaptureWriter;
//!
//! let channels = Channels::new();
//! let capture = CaptureWriter::new();
//! channels.add_channel("main", Box::new(capture.clone()));
//!
//! assert!(channels.emit("main", format_args!("DEBUG (0): booted")));
//! assert!(!channels.emit("radio", format_args!("DEBUG (0): dropped")));
//! assert_eq!(capture.contents(), "DEBUG (0): booted\n");
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::{SharedWriter, Writer, shared};

/// Registry of named output channels.
#[derive(Default)]
pub struct Channels {
    channels: RefCell<BTreeMap<String, Vec<SharedWriter>>>,
}

impl Channels {
    /// Create a registry with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a writer to the named channel.
    pub fn add_channel(&self, name: &str, writer: Writer) {
        self.add_shared(name, shared(writer));
    }

    /// Attach an already shared writer to the named channel.
    pub fn add_shared(&self, name: &str, writer: SharedWriter) {
        self.channels
            .borrow_mut()
            .entry(name.trim().to_string())
            .or_default()
            .push(writer);
    }

    /// Detach all writers from a channel. Returns whether it existed.
    pub fn remove_channel(&self, name: &str) -> bool {
        self.channels.borrow_mut().remove(name.trim()).is_some()
    }

    /// Whether any writer is attached to the channel.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.channels.borrow().contains_key(name.trim())
    }

    /// Names of all channels with writers attached, in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.channels.borrow().keys().cloned().collect()
    }

    /// Write one line to every writer attached to any of the listed channels.
    ///
    /// Returns `true` if the line was written to at least one writer.
    pub fn emit(&self, names: &str, line: fmt::Arguments) -> bool {
        let channels = self.channels.borrow();
        let mut targets: Vec<&SharedWriter> = Vec::new();
        for name in names.split(',') {
            if let Some(writers) = channels.get(name.trim()) {
                for writer in writers {
                    if !targets.iter().any(|t| Rc::ptr_eq(t, writer)) {
                        targets.push(writer);
                    }
                }
            }
        }

        for writer in &targets {
            // Best effort
            let _ = writeln!(writer.borrow_mut(), "{line}");
        }
        !targets.is_empty()
    }

    /// Flush all attached writers.
    pub fn flush(&self) {
        for writers in self.channels.borrow().values() {
            for writer in writers {
                let _ = writer.borrow_mut().flush();
            }
        }
    }
}
