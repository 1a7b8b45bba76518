// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! The YAML scenario format (§6.1): prestates, timeslots, poststates.
//!
//! This loader is an "external collaborator" per the spec's scope — the
//! core only depends on the structured shape below — but the crate still
//! ships a concrete implementation of it, the same way the teacher's
//! `testing/conformance/src/vector.rs` ships a concrete `MessageVector`
//! loader alongside the FVM core it drives.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::ScoutError;
use crate::types::{Address, StateRoot};

#[derive(Debug, Deserialize, Clone)]
pub struct PrestateRecord {
    pub envid: Address,
    pub shardid: u64,
    pub code: String,
    pub stateroot: StateRoot,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeslotEntry {
    pub envid: Address,
    #[serde(default, with = "hex_bytes")]
    pub inputdata: Vec<u8>,
}

/// One timeslot: an ordered group of entries executed before the next
/// shard-root refresh. The YAML shape is `timeslots: [ slot: [ entry, ... ] ]`.
#[derive(Debug, Deserialize, Clone)]
pub struct Timeslot {
    pub slot: Vec<TimeslotEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PoststateRecord {
    pub envid: Address,
    pub shardid: u64,
    pub stateroot: StateRoot,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Scenario {
    #[serde(default)]
    pub prestates: Vec<PrestateRecord>,
    #[serde(default)]
    pub timeslots: Vec<Timeslot>,
    #[serde(default)]
    pub poststates: Vec<PoststateRecord>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, ScoutError> {
        let file = File::open(path).map_err(|source| ScoutError::BytecodeRead {
            path: path.display().to_string(),
            source,
        })?;
        let reader = BufReader::new(file);
        let scenario = serde_yaml::from_reader(reader)?;
        Ok(scenario)
    }
}

/// `0x`-prefixed, even-length hex byte strings. Per the Open Questions
/// resolution in §9/§6.1: strip the `0x` prefix, decode the remainder. An
/// empty `inputdata` (after stripping) decodes to a zero-length sequence.
mod hex_bytes {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| de::Error::custom(format!("expected 0x-prefixed hex, got {s:?}")))?;
        hex::decode(stripped).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_scenario() {
        let yaml = r#"
prestates:
  - envid: "0x0100000000000000000000000000000000000000000000000000000000000000"
    shardid: 0
    code: "envs/noop.wasm"
    stateroot: "0x1111111111111111111111111111111111111111111111111111111111111111"
timeslots:
  - slot:
      - envid: "0x0100000000000000000000000000000000000000000000000000000000000000"
        inputdata: "0x0102"
poststates:
  - envid: "0x0100000000000000000000000000000000000000000000000000000000000000"
    stateroot: "0x1111111111111111111111111111111111111111111111111111111111111111"
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.prestates.len(), 1);
        assert_eq!(scenario.timeslots[0].slot[0].inputdata, vec![0x01, 0x02]);
        assert_eq!(scenario.poststates.len(), 1);
    }

    #[test]
    fn empty_inputdata_decodes_to_empty_vec() {
        let yaml = r#"
prestates: []
timeslots:
  - slot:
      - envid: "0x0100000000000000000000000000000000000000000000000000000000000000"
        inputdata: "0x"
poststates: []
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(scenario.timeslots[0].slot[0].inputdata.is_empty());
    }

    #[test]
    fn missing_prefix_is_rejected() {
        let yaml = r#"
prestates: []
timeslots:
  - slot:
      - envid: "0x0100000000000000000000000000000000000000000000000000000000000000"
        inputdata: "0102"
poststates: []
"#;
        let result: Result<Scenario, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
