// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The simulation driver.
//!
//! A [`Driver`] configures a [`Simulator`] from the topology and noise trace
//! files, boots the motes and then steps the simulation until the simulated
//! time passes the configured bound. After each step it paces the run
//! against the wall clock and forwards serial output to any connected
//! clients.
//!
//! Every collaborator call returns a result, a failure anywhere ends the run
//! with that error. A simulator that runs out of events before the time
//! bound ends the run early, this is reported in the [`RunReport`].

use std::io::{self, Write};
use std::rc::Rc;

use bsn_engine::sim_error;
use bsn_engine::time::{secs_to_ticks, ticks_to_secs};
use bsn_engine::traits::Simulator;
use bsn_engine::types::{SimError, SimResult, SimTime};
use bsn_track::entity::Entity;
use bsn_track::{SharedWriter, Writer, debug, info, shared, warn};
use indicatif::ProgressBar;
use itertools::Itertools;

use crate::forwarder::SerialForwarder;
use crate::noise_trace::load_noise_trace;
use crate::settings::DriverSettings;
use crate::throttle::{Throttle, ThrottleStatistics};
use crate::topology::load_topology;

/// Write a line of progress text to the console.
macro_rules! say {
    ($console:expr, $($arg:tt)+) => {
        writeln!($console, $($arg)+).map_err(console_error)
    };
}

fn console_error(e: io::Error) -> SimError {
    SimError(format!("Unable to write to console: {e}"))
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub links: usize,
    pub noise_samples: usize,
    /// Noise trace lines past the sample cap.
    pub noise_samples_skipped: usize,
    pub events_run: u64,
    pub final_time: SimTime,
    /// The simulator ran out of events before the time bound.
    pub exhausted: bool,
    pub forwarded: u64,
    pub throttle: ThrottleStatistics,
}

pub struct Driver<S: Simulator> {
    pub entity: Rc<Entity>,
    sim: S,
    settings: DriverSettings,
    console: Writer,
    channel_writer: SharedWriter,
}

impl<S: Simulator> Driver<S> {
    /// Create a driver that prints to stdout.
    pub fn new(parent: &Rc<Entity>, sim: S, settings: DriverSettings) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "driver")),
            sim,
            settings,
            console: Box::new(io::stdout()),
            channel_writer: shared(Box::new(io::stdout())),
        }
    }

    /// Send the progress text to `console` instead of stdout.
    #[must_use]
    pub fn with_console(mut self, console: Writer) -> Self {
        self.console = console;
        self
    }

    /// Send the debug channels to `writer` instead of stdout. All channels
    /// share the one writer.
    #[must_use]
    pub fn with_channel_writer(mut self, writer: Writer) -> Self {
        self.channel_writer = shared(writer);
        self
    }

    pub fn simulator(&self) -> &S {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Set up the simulation, run it and print the throttle statistics.
    pub fn run(&mut self) -> Result<RunReport, SimError> {
        say!(self.console, "BSN mote simulation")?;

        self.init_simulator()?;
        self.add_channels()?;
        self.boot_nodes()?;
        let links = self.load_topology()?;
        let (noise_samples, noise_samples_skipped) = self.load_noise()?;
        self.create_noise_models()?;

        let mut forwarder = if self.settings.forward {
            Some(SerialForwarder::bind(&self.entity, self.settings.forward_port)?)
        } else {
            None
        };
        let mut throttle = Throttle::new(
            self.settings.throttle_interval_ms,
            self.settings.throttle_speed,
        )?;

        say!(self.console, "Start simulation\n")?;
        let (events_run, exhausted) = self.drive(forwarder.as_mut(), &mut throttle)?;
        let finished = self.secs_now();
        say!(self.console, "\nSimulation finished at {finished:.3}s")?;

        let statistics = throttle.statistics();
        say!(self.console, "{statistics}")?;
        self.console.flush().map_err(console_error)?;

        Ok(RunReport {
            links,
            noise_samples,
            noise_samples_skipped,
            events_run,
            final_time: self.sim.time(),
            exhausted,
            forwarded: forwarder.as_ref().map_or(0, SerialForwarder::forwarded),
            throttle: statistics,
        })
    }

    fn init_simulator(&mut self) -> SimResult {
        say!(self.console, "Initializing mac")?;
        let mac = self.sim.mac();
        debug!(self.entity ; "mac backoff {}-{} symbols", mac.init_low, mac.init_high);
        say!(self.console, "Initializing radio channels")?;
        let links = self.sim.radio().link_count();
        debug!(self.entity ; "radio starts with {links} links");
        say!(
            self.console,
            "    using topology file: {}",
            self.settings.topology_file.display()
        )?;
        say!(
            self.console,
            "    using noise file: {}",
            self.settings.noise_file.display()
        )?;
        say!(self.console, "Initializing simulator")?;
        self.sim.init()
    }

    fn add_channels(&mut self) -> SimResult {
        for channel in &self.settings.channels {
            say!(self.console, "Activate debug messages on channel {channel}")?;
            self.sim.add_channel(channel, self.channel_writer.clone());
        }
        info!(self.entity ; "channels: {}", self.settings.channels.iter().join(","));
        Ok(())
    }

    fn boot_nodes(&mut self) -> SimResult {
        let tps = self.sim.ticks_per_second();
        let boot_time = secs_to_ticks(self.settings.boot_seconds, tps);
        for id in 0..self.settings.num_nodes {
            say!(self.console, "Creating node {id}")?;
            self.sim.node(id)?.boot_at_time(boot_time)?;
            say!(
                self.console,
                ">>> Will boot at time {} [sec]",
                self.settings.boot_seconds
            )?;
        }
        Ok(())
    }

    fn load_topology(&mut self) -> Result<usize, SimError> {
        say!(self.console, "Creating radio channels")?;
        let edges = load_topology(&self.settings.topology_file)?;
        for edge in &edges {
            say!(
                self.console,
                ">>> Setting radio channel from node {} to node {} with gain {} dBm",
                edge.src, edge.dst, edge.gain
            )?;
            self.sim.radio().add(edge.src, edge.dst, edge.gain)?;
        }
        info!(self.entity ; "{} radio links registered", edges.len());
        Ok(edges.len())
    }

    fn load_noise(&mut self) -> Result<(usize, usize), SimError> {
        say!(self.console, "Initializing Closest Pattern Matching (CPM)")?;
        say!(
            self.console,
            "Reading noise model data file: {}",
            self.settings.noise_file.display()
        )?;
        let trace = load_noise_trace(&self.settings.noise_file, self.settings.max_noise_samples)?;
        if trace.excess > 0 {
            warn!(self.entity ; "{} noise samples past the cap of {} ignored",
                trace.excess,
                self.settings.max_noise_samples
            );
        }

        write!(self.console, "Loading: ").map_err(console_error)?;
        for (index, reading) in trace.samples.iter().enumerate() {
            for id in 0..self.settings.num_nodes {
                self.sim.node(id)?.add_noise_trace_reading(*reading)?;
            }
            let every = self.settings.progress_every;
            if every > 0 && (index + 1) % every == 0 {
                write!(self.console, "#")
                    .and_then(|()| self.console.flush())
                    .map_err(console_error)?;
            }
        }
        say!(self.console, "Done!")?;
        Ok((trace.samples.len(), trace.excess))
    }

    fn create_noise_models(&mut self) -> SimResult {
        for id in 0..self.settings.num_nodes {
            say!(self.console, ">>> Creating noise model for node: {id}")?;
            self.sim.node(id)?.create_noise_model()?;
        }
        Ok(())
    }

    /// Step the simulation until the time bound. Returns the number of events
    /// run and whether the simulator ran out of events.
    fn drive(
        &mut self,
        mut forwarder: Option<&mut SerialForwarder>,
        throttle: &mut Throttle,
    ) -> Result<(u64, bool), SimError> {
        let tps = self.sim.ticks_per_second();
        let Some(bound) = self.settings.run_seconds.checked_mul(tps) else {
            return sim_error!(
                "run time of {}s overflows the simulator's clock",
                self.settings.run_seconds
            );
        };

        let progress_bar = self
            .settings
            .progress
            .then(|| ProgressBar::new(self.settings.run_seconds));

        if let Some(forwarder) = forwarder.as_deref_mut() {
            forwarder.process(&self.sim.take_serial_output())?;
        }
        if self.settings.throttle {
            throttle.initialize(self.sim.time(), tps)?;
        }

        let mut events_run = 0;
        let mut exhausted = false;
        while self.sim.time() <= bound {
            if !self.sim.run_next_event()? {
                warn!(self.entity ; "no events left at {:.3}s, stopping before {}s",
                    self.secs_now(),
                    self.settings.run_seconds
                );
                exhausted = true;
                break;
            }
            events_run += 1;

            if self.settings.throttle {
                throttle.check_throttle(self.sim.time())?;
            }
            let packets = self.sim.take_serial_output();
            if let Some(forwarder) = forwarder.as_deref_mut() {
                forwarder.process(&packets)?;
            }
            if let Some(bar) = &progress_bar {
                bar.set_position((self.sim.time() / tps).min(self.settings.run_seconds));
            }
        }

        if let Some(bar) = progress_bar {
            bar.finish();
        }
        info!(self.entity ; "{events_run} events run");
        Ok((events_run, exhausted))
    }

    fn secs_now(&self) -> f64 {
        ticks_to_secs(self.sim.time(), self.sim.ticks_per_second())
    }
}
