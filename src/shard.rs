// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! The shard index: a fixed-size table from shard id to the set of account
//! addresses bound to it, plus each shard's derived state-root cache.

use std::collections::BTreeSet;

use crate::types::{Address, StateRoot};

/// Fixed domain of shard ids, per §3.1: `0 .. NUM_SHARDS`.
pub const NUM_SHARDS: u64 = 64;

#[derive(Default, Clone)]
struct ShardEntry {
    accounts: BTreeSet<Address>,
    state_root: Option<StateRoot>,
}

/// Per-shard bookkeeping. Holds addresses, not account references: the
/// `WorldStore` is the sole owner of every `Account`, and a shard entry is a
/// lookup key into it, not a borrow.
pub struct ShardTable {
    shards: Vec<ShardEntry>,
}

impl ShardTable {
    pub fn new() -> Self {
        ShardTable {
            shards: vec![ShardEntry::default(); NUM_SHARDS as usize],
        }
    }

    /// Registers `address` into `shard_id`'s account set.
    ///
    /// Returns `false` if `address` was already present in that shard (the
    /// caller is responsible for turning that into
    /// [`crate::error::ScoutError::DuplicateAccountInShard`]).
    ///
    /// # Panics
    /// Panics if `shard_id >= NUM_SHARDS`; callers must validate with
    /// [`ShardTable::in_range`] first.
    pub fn bind(&mut self, shard_id: u64, address: Address) -> bool {
        self.shards[shard_id as usize].accounts.insert(address)
    }

    pub fn in_range(shard_id: u64) -> bool {
        shard_id < NUM_SHARDS
    }

    pub fn account_count(&self, shard_id: u64) -> usize {
        self.shards[shard_id as usize].accounts.len()
    }

    /// The derived root rule (§4.6): defined only when the shard has
    /// exactly one bound account, in which case it mirrors that account's
    /// `state_root`. Undefined (returns `None`) for zero or multiple
    /// accounts.
    pub fn derived_root(&self, shard_id: u64) -> Option<StateRoot> {
        if !Self::in_range(shard_id) {
            return None;
        }
        let entry = &self.shards[shard_id as usize];
        if entry.accounts.len() == 1 {
            entry.state_root
        } else {
            None
        }
    }

    /// Snapshots the currently cached derived root of every shard, indexed
    /// by shard id. Used to give a call's host functions a read-only view
    /// of shard roots as of the start of the call (§4.5: cross-shard reads
    /// within a timeslot observe the pre-slot cached values).
    pub fn snapshot(&self) -> std::rc::Rc<Vec<Option<StateRoot>>> {
        std::rc::Rc::new(
            (0..NUM_SHARDS)
                .map(|shard_id| self.derived_root(shard_id))
                .collect(),
        )
    }

    /// Refreshes the cached derived root for every shard with exactly one
    /// account, reading `state_root_of` for that shard's sole address. Used
    /// identically by P2 (initial) and the post-timeslot refresh in P3 — the
    /// same diagonal rule both times, per the REDESIGN FLAG resolution.
    pub fn refresh<F>(&mut self, mut state_root_of: F)
    where
        F: FnMut(Address) -> StateRoot,
    {
        for entry in &mut self.shards {
            entry.state_root = match entry.accounts.len() {
                1 => {
                    let addr = *entry.accounts.iter().next().unwrap();
                    Some(state_root_of(addr))
                }
                _ => None,
            };
        }
    }
}

impl Default for ShardTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_root_undefined_for_empty_shard() {
        let table = ShardTable::new();
        assert_eq!(table.derived_root(0), None);
    }

    #[test]
    fn derived_root_undefined_for_multi_account_shard() {
        let mut table = ShardTable::new();
        table.bind(3, Address::from_index(1));
        table.bind(3, Address::from_index(2));
        table.refresh(|_| StateRoot([0xCC; 32]));
        assert_eq!(table.derived_root(3), None);
    }

    #[test]
    fn derived_root_mirrors_sole_account() {
        let mut table = ShardTable::new();
        table.bind(0, Address::from_index(1));
        table.refresh(|_| StateRoot([0xCC; 32]));
        assert_eq!(table.derived_root(0), Some(StateRoot([0xCC; 32])));
    }

    #[test]
    fn out_of_range_shard_is_rejected() {
        assert!(!ShardTable::in_range(NUM_SHARDS));
        assert!(ShardTable::in_range(NUM_SHARDS - 1));
    }
}
