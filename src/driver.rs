// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! The Driver: phased orchestration of prestate load, timeslot replay,
//! shard-root refresh, and poststate verification (§4.5).
//!
//! Grounded on `testing/conformance/src/driver.rs`'s `run_variant`: build
//! the execution context from a vector, apply everything in order, compare
//! the result, and accumulate failures into a typed outcome rather than
//! panicking or aborting the whole run on the first mismatch.

use std::fs;

use crate::account::{Account, ExecOutcome};
use crate::error::ScoutError;
use crate::scenario::Scenario;
use crate::shard::ShardTable;
use crate::types::{Address, StateRoot};
use crate::world::WorldStore;

/// The process-singleton state for one run: the World Store plus the shard
/// index, bundled into a single value per the §9 design note (replacing the
/// source's file-scope mutable globals).
#[derive(Default)]
pub struct World {
    pub store: WorldStore,
    pub shards: ShardTable,
}

impl World {
    pub fn new() -> Self {
        World::default()
    }

    /// Sets (or refreshes) every shard's derived root from its sole bound
    /// account's current `state_root`. Used identically by P2 and the
    /// post-timeslot refresh in P3.
    fn refresh_shard_roots(&mut self) {
        let store = &self.store;
        self.shards.refresh(|addr| {
            store
                .get(addr)
                .map(Account::state_root)
                .unwrap_or_else(|_| StateRoot::zero())
        });
    }
}

/// One poststate comparison that did not match.
#[derive(Debug)]
pub struct Mismatch {
    pub envid: Address,
    pub expected: StateRoot,
    pub actual: StateRoot,
}

/// The result of a full run (P1-P4).
#[derive(Debug)]
pub struct RunReport {
    pub mismatches: Vec<Mismatch>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Runs a full P1-P4 replay of `scenario` against a fresh [`World`].
///
/// Fatal conditions (scenario parse errors are handled by the caller before
/// this is reached; load-time errors below) abort the run with `Err`.
/// Per-timeslot-entry faults (`UnknownAddress`, decode/trap/missing-export)
/// are logged and do not abort — see §7.
pub fn run(scenario: &Scenario) -> Result<RunReport, ScoutError> {
    let mut world = World::new();

    // P1 — load prestates.
    for prestate in &scenario.prestates {
        let bytecode = fs::read(&prestate.code).map_err(|source| ScoutError::BytecodeRead {
            path: prestate.code.clone(),
            source,
        })?;
        let account = Account::new(
            prestate.envid,
            prestate.shardid,
            bytecode,
            prestate.stateroot,
            &mut world.shards,
        )?;
        world.store.insert(account)?;
        log::info!(
            "loaded prestate envid={:?} shard={}",
            prestate.envid,
            prestate.shardid
        );
    }

    // P2 — initialize shard roots.
    world.refresh_shard_roots();

    // P3 — replay timeslots.
    for (slot_idx, timeslot) in scenario.timeslots.iter().enumerate() {
        for entry in &timeslot.slot {
            let account = match world.store.get_mut(entry.envid) {
                Ok(account) => account,
                Err(err) => {
                    log::warn!(
                        "timeslot {slot_idx}: skipping unknown address {:?}: {err}",
                        entry.envid
                    );
                    continue;
                }
            };
            match account.exec(&entry.inputdata, &world.shards) {
                ExecOutcome::Completed => {
                    log::debug!("timeslot {slot_idx}: executed {:?}", entry.envid);
                }
                ExecOutcome::Faulted(fault) => {
                    log::warn!(
                        "timeslot {slot_idx}: {:?} faulted: {fault}",
                        entry.envid
                    );
                }
            }
        }
        // Refresh granularity is per-timeslot, not per-entry (§4.5).
        world.refresh_shard_roots();
    }

    // P4 — verify poststates.
    let mut mismatches = Vec::new();
    for poststate in &scenario.poststates {
        let account = world.store.get(poststate.envid)?;
        let actual = account.state_root();
        if actual != poststate.stateroot {
            mismatches.push(Mismatch {
                envid: poststate.envid,
                expected: poststate.stateroot,
                actual,
            });
        }
    }

    if mismatches.is_empty() {
        log::info!("passed");
    } else {
        for m in &mismatches {
            log::error!(
                "poststate mismatch for {:?}: expected {:?}, got {:?}",
                m.envid,
                m.expected,
                m.actual
            );
        }
    }

    Ok(RunReport { mismatches })
}
