// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! This crate provides the hierarchical configuration of the BSN simulation
//! driver. Settings can come from a TOML configuration file, environment
//! variables, and the command line.
//!
//! # Priority of sources
//!
//! Where the same setting is supplied by multiple sources the following
//! priority order is applied (highest first):
//!
//! 1. command-line arguments
//! 2. environment variables prefixed with `BSN_` (for example
//!    `BSN_NUM_NODES=8` or `BSN_CHANNELS=[main,app_out]`)
//! 3. the TOML file named by `--conf-file` / `BSN_CONF_FILE`
//! 4. the defaults of [`DriverConfig`]
//!
//! Every field is an `Option` so that a source which does not mention a
//! setting leaves it untouched.
//!
//! # Example
//!
//! ```
//! use bsn_config::DriverConfig;
//!
//! let config = DriverConfig::parse_from(["bsn-sim", "--num-nodes", "8"]).unwrap();
//! assert_eq!(config.num_nodes, Some(8));
//! assert_eq!(config.forward_port, Some(9001));
//! ```
//!
//! A configuration file for the same settings would look like:
//! ```toml
//! num_nodes = 8
//! topology_file = "topology.txt"
//! channels = ["main", "app_out"]
//! throttle = false
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Prefix of environment variables read by [`DriverConfig`].
pub const ENV_PREFIX: &str = "BSN_";

/// The error returned when a configuration source cannot be used.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError(e.to_string())
    }
}

/// All settings of a simulation run.
#[derive(Clone, Debug, Deserialize, Parser, PartialEq, Serialize)]
#[command(
    name = "bsn-sim",
    about = "Drive a TinyBSN mote simulation from a topology and a noise trace."
)]
pub struct DriverConfig {
    /// Level of log message to display.
    #[arg(long)]
    pub log_level: Option<log::Level>,

    /// Regular expression for which entities should log at `--log-level`.
    /// Others only log errors.
    #[arg(long)]
    pub log_filter_regex: Option<String>,

    /// Topology file: one `<src> <dst> <gain>` link per line.
    #[arg(long)]
    pub topology_file: Option<PathBuf>,

    /// Noise trace file: one integer reading per line.
    #[arg(long)]
    pub noise_file: Option<PathBuf>,

    /// Number of motes to create (ids `0..num_nodes`).
    #[arg(long)]
    pub num_nodes: Option<u16>,

    /// Simulated seconds after which the run stops.
    #[arg(long)]
    pub run_seconds: Option<u64>,

    /// Simulated second at which every mote boots.
    #[arg(long)]
    pub boot_seconds: Option<f64>,

    /// Maximum number of noise readings given to each mote.
    #[arg(long)]
    pub max_noise_samples: Option<usize>,

    /// Print a progress marker after this many noise readings.
    #[arg(long)]
    pub progress_every: Option<usize>,

    /// Debug channels to print to stdout.
    #[arg(long, value_delimiter = ',')]
    pub channels: Option<Vec<String>>,

    /// Forward mote serial output over TCP.
    #[arg(long)]
    pub forward: Option<bool>,

    /// TCP port of the serial forwarder.
    #[arg(long)]
    pub forward_port: Option<u16>,

    /// Pace the simulation against the wall clock.
    #[arg(long)]
    pub throttle: Option<bool>,

    /// Simulated milliseconds between two throttle checks.
    #[arg(long)]
    pub throttle_interval_ms: Option<u64>,

    /// Simulated seconds per wall-clock second when throttling.
    #[arg(long)]
    pub throttle_speed: Option<f64>,

    /// Random seed of the simulator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show a progress bar of simulated time.
    #[arg(long)]
    pub progress: Option<bool>,

    /// Path to additional configuration file
    ///
    /// This additional configuration file must contain TOML, and set values
    /// for fields of this struct.
    #[arg(long)]
    pub conf_file: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            log_level: Some(log::Level::Info),
            log_filter_regex: Some(String::new()),
            topology_file: Some(PathBuf::from("topology.txt")),
            noise_file: Some(PathBuf::from("meyer-heavy.txt")),
            num_nodes: Some(5),
            run_seconds: Some(130),
            boot_seconds: Some(0.0),
            max_noise_samples: Some(10_000),
            progress_every: Some(5_000),
            channels: Some(
                ["info", "main", "warn", "app_out"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            ),
            forward: Some(true),
            forward_port: Some(9001),
            throttle: Some(true),
            throttle_interval_ms: Some(10),
            throttle_speed: Some(1.0),
            seed: Some(1),
            progress: Some(false),
            conf_file: Some(PathBuf::new()),
        }
    }
}

macro_rules! merge_fields {
    ($into:expr, $from:expr ; $($field:ident),* $(,)?) => {
        $(
            if $from.$field.is_some() {
                $into.$field = $from.$field;
            }
        )*
    };
}

impl DriverConfig {
    /// Parse the process command line and merge all other sources.
    ///
    /// Exits the process with a usage message if the command line is invalid
    /// or `--help` was requested.
    pub fn parse_all_sources() -> Result<Self, ConfigError> {
        Self::from_sources(Self::parse())
    }

    /// Parse the given command line and merge all other sources.
    pub fn parse_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Self::try_parse_from(args).map_err(|e| ConfigError(e.to_string()))?;
        Self::from_sources(cli)
    }

    fn from_sources(cli: Self) -> Result<Self, ConfigError> {
        let env: Self = Figment::new()
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;

        let mut config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .extract()?;

        let conf_file = cli.conf_file.clone().or_else(|| env.conf_file.clone());
        if let Some(conf_file) = conf_file {
            config.parse_extra_conf_file(&conf_file)?;
        }

        config.merge(env);
        config.merge(cli);
        Ok(config)
    }

    /// Update this configuration with the values set in a TOML file.
    ///
    /// Only settings present in the file are changed. An empty path is
    /// ignored.
    pub fn parse_extra_conf_file(&mut self, conf_file: &Path) -> Result<(), ConfigError> {
        if conf_file.as_os_str().is_empty() {
            return Ok(());
        }

        if conf_file.is_dir() {
            return Err(ConfigError(format!(
                "{} is not a file path",
                conf_file.display()
            )));
        }

        if !conf_file.exists() {
            return Err(ConfigError(format!("{} not found", conf_file.display())));
        }

        let from_file: Self = Figment::new().merge(Toml::file(conf_file)).extract()?;
        self.merge(from_file);
        Ok(())
    }

    /// Take every setting that is `Some` in `other`.
    pub fn merge(&mut self, other: Self) {
        merge_fields!(self, other ;
            log_level,
            log_filter_regex,
            topology_file,
            noise_file,
            num_nodes,
            run_seconds,
            boot_seconds,
            max_noise_samples,
            progress_every,
            channels,
            forward,
            forward_port,
            throttle,
            throttle_interval_ms,
            throttle_speed,
            seed,
            progress,
            conf_file,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_takes_set_values() {
        let mut config = DriverConfig::default();
        let other = DriverConfig {
            num_nodes: Some(2),
            forward: Some(false),
            ..empty()
        };
        config.merge(other);

        assert_eq!(config.num_nodes, Some(2));
        assert_eq!(config.forward, Some(false));
        assert_eq!(config.forward_port, Some(9001));
    }

    fn empty() -> DriverConfig {
        DriverConfig {
            log_level: None,
            log_filter_regex: None,
            topology_file: None,
            noise_file: None,
            num_nodes: None,
            run_seconds: None,
            boot_seconds: None,
            max_noise_samples: None,
            progress_every: None,
            channels: None,
            forward: None,
            forward_port: None,
            throttle: None,
            throttle_interval_ms: None,
            throttle_speed: None,
            seed: None,
            progress: None,
            conf_file: None,
        }
    }
}
