// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Radio topology files.
//!
//! One directed link per line: `<src> <dst> <gain>`, separated by any
//! whitespace. Blank lines are ignored. Duplicate and asymmetric links are
//! accepted as they are.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bsn_engine::sim_error;
use bsn_engine::types::{NodeId, SimError};

#[derive(Clone, Debug, PartialEq)]
pub struct TopologyEdge {
    pub src: NodeId,
    pub dst: NodeId,
    /// Link gain in dB.
    pub gain: f64,
}

pub fn parse_topology<R: BufRead>(reader: R) -> Result<Vec<TopologyEdge>, SimError> {
    let mut edges = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        let line =
            line.map_err(|e| SimError(format!("Unable to read topology line {line_num}: {e}")))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => continue,
            [src, dst, gain] => edges.push(TopologyEdge {
                src: parse_field(src, "source node", line_num)?,
                dst: parse_field(dst, "destination node", line_num)?,
                gain: parse_field(gain, "gain", line_num)?,
            }),
            _ => {
                let found = fields.len();
                return sim_error!(
                    "topology line {line_num}: expected `<src> <dst> <gain>`, \
                     found {found} fields in {line:?}"
                );
            }
        }
    }
    Ok(edges)
}

pub fn load_topology(path: &Path) -> Result<Vec<TopologyEdge>, SimError> {
    let file = File::open(path)
        .map_err(|e| SimError(format!("Unable to read {}: {e}", path.display())))?;
    parse_topology(BufReader::new(file))
        .map_err(|e| SimError(format!("{}: {}", path.display(), e.0)))
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    what: &str,
    line_num: usize,
) -> Result<T, SimError>
where
    T::Err: std::fmt::Display,
{
    field
        .parse()
        .map_err(|e| SimError(format!("topology line {line_num}: invalid {what} {field:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_skipped() {
        let edges = parse_topology("0 1 -10.5\n1 2 3.2\n\n".as_bytes()).unwrap();
        assert_eq!(
            edges,
            vec![
                TopologyEdge {
                    src: 0,
                    dst: 1,
                    gain: -10.5
                },
                TopologyEdge {
                    src: 1,
                    dst: 2,
                    gain: 3.2
                },
            ]
        );
    }

    #[test]
    fn any_whitespace_separates() {
        let edges = parse_topology("  3\t4   -60.0  \n   \n".as_bytes()).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].dst, 4);
    }

    #[test]
    fn duplicates_kept() {
        let edges = parse_topology("0 1 -50\n0 1 -50\n1 0 -70\n".as_bytes()).unwrap();
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn two_fields_rejected() {
        let err = parse_topology("0 1 -10\n1 2\n".as_bytes()).unwrap_err();
        assert!(err.0.contains("line 2"), "{err}");
    }

    #[test]
    fn non_numeric_rejected() {
        assert!(parse_topology("a 1 -10\n".as_bytes()).is_err());
        assert!(parse_topology("0 1 loud\n".as_bytes()).is_err());
        assert!(parse_topology("0 70000 -1\n".as_bytes()).is_err());
    }

    #[test]
    fn missing_file() {
        let err = load_topology(Path::new("/no/such/topology.txt")).unwrap_err();
        assert!(err.0.contains("/no/such/topology.txt"));
    }
}
