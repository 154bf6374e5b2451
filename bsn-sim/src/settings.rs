// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The resolved settings of one driver run.

use std::path::PathBuf;

use bsn_config::DriverConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct DriverSettings {
    pub topology_file: PathBuf,
    pub noise_file: PathBuf,
    pub num_nodes: u16,
    /// Simulated seconds after which the drive loop stops.
    pub run_seconds: u64,
    pub boot_seconds: f64,
    pub max_noise_samples: usize,
    /// Print a progress marker after this many noise samples. Zero disables
    /// the markers.
    pub progress_every: usize,
    pub channels: Vec<String>,
    pub forward: bool,
    pub forward_port: u16,
    pub throttle: bool,
    pub throttle_interval_ms: u64,
    pub throttle_speed: f64,
    pub progress: bool,
}

impl From<&DriverConfig> for DriverSettings {
    fn from(config: &DriverConfig) -> Self {
        let defaults = DriverConfig::default();
        macro_rules! pick {
            ($field:ident) => {
                config
                    .$field
                    .clone()
                    .or(defaults.$field.clone())
                    .unwrap_or_default()
            };
        }
        Self {
            topology_file: pick!(topology_file),
            noise_file: pick!(noise_file),
            num_nodes: pick!(num_nodes),
            run_seconds: pick!(run_seconds),
            boot_seconds: pick!(boot_seconds),
            max_noise_samples: pick!(max_noise_samples),
            progress_every: pick!(progress_every),
            channels: pick!(channels),
            forward: pick!(forward),
            forward_port: pick!(forward_port),
            throttle: pick!(throttle),
            throttle_interval_ms: pick!(throttle_interval_ms),
            throttle_speed: pick!(throttle_speed),
            progress: pick!(progress),
        }
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self::from(&DriverConfig::default())
    }
}
