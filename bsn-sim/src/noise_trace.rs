// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Noise trace files: one integer reading (dBm) per line, blank lines
//! ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bsn_engine::types::SimError;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoiseTrace {
    /// The accepted readings, at most the cap given when parsing.
    pub samples: Vec<i32>,
    /// Non-blank lines past the cap. These are counted but not parsed.
    pub excess: usize,
}

pub fn parse_noise_trace<R: BufRead>(reader: R, cap: usize) -> Result<NoiseTrace, SimError> {
    let mut trace = NoiseTrace::default();
    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        let line =
            line.map_err(|e| SimError(format!("Unable to read noise line {line_num}: {e}")))?;
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        if trace.samples.len() >= cap {
            trace.excess += 1;
            continue;
        }
        let sample = value.parse().map_err(|e| {
            SimError(format!("noise line {line_num}: invalid reading {value:?}: {e}"))
        })?;
        trace.samples.push(sample);
    }
    Ok(trace)
}

pub fn load_noise_trace(path: &Path, cap: usize) -> Result<NoiseTrace, SimError> {
    let file = File::open(path)
        .map_err(|e| SimError(format!("Unable to read {}: {e}", path.display())))?;
    parse_noise_trace(BufReader::new(file), cap)
        .map_err(|e| SimError(format!("{}: {}", path.display(), e.0)))
}
