// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! The World Store: the process-singleton map from address to account.

use std::collections::BTreeMap;

use crate::account::Account;
use crate::error::ScoutError;
use crate::types::Address;

/// Owns every [`Account`] created during prestate load. Lives for the
/// entire run; there is no explicit teardown beyond dropping it.
#[derive(Default)]
pub struct WorldStore {
    accounts: BTreeMap<Address, Account>,
}

impl WorldStore {
    pub fn new() -> Self {
        WorldStore::default()
    }

    /// Inserts `account`, keyed by its address.
    ///
    /// # Errors
    /// Returns [`ScoutError::DuplicateAddress`] if the address is already
    /// present (I1: this crate forbids silent overwrite).
    pub fn insert(&mut self, account: Account) -> Result<(), ScoutError> {
        let address = account.address;
        if self.accounts.contains_key(&address) {
            return Err(ScoutError::DuplicateAddress(address));
        }
        self.accounts.insert(address, account);
        Ok(())
    }

    pub fn get(&self, address: Address) -> Result<&Account, ScoutError> {
        self.accounts
            .get(&address)
            .ok_or(ScoutError::UnknownAddress(address))
    }

    pub fn get_mut(&mut self, address: Address) -> Result<&mut Account, ScoutError> {
        self.accounts
            .get_mut(&address)
            .ok_or(ScoutError::UnknownAddress(address))
    }

    /// Yields `(address, account)` pairs in byte-lexicographic order of
    /// address — deterministic, though not required for correctness.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::ShardTable;
    use crate::types::StateRoot;

    fn test_account(index: u32, shards: &mut ShardTable) -> Account {
        Account::new(Address::from_index(index), 0, vec![], StateRoot::zero(), shards).unwrap()
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut shards = ShardTable::new();
        let mut world = WorldStore::new();
        let addr = Address::from_index(1);
        world.insert(test_account(1, &mut shards)).unwrap();
        assert_eq!(world.get(addr).unwrap().address, addr);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut shards = ShardTable::new();
        let mut world = WorldStore::new();
        world.insert(test_account(1, &mut shards)).unwrap();
        // A second account at the same address would itself be rejected by
        // the shard table first in a real flow; construct it in a
        // different shard's table to isolate the WorldStore check.
        let mut other_shards = ShardTable::new();
        let err = world
            .insert(test_account(1, &mut other_shards))
            .unwrap_err();
        assert!(matches!(err, ScoutError::DuplicateAddress(_)));
    }

    #[test]
    fn unknown_address_is_rejected() {
        let world = WorldStore::new();
        let err = world.get(Address::from_index(9)).unwrap_err();
        assert!(matches!(err, ScoutError::UnknownAddress(_)));
    }

    #[test]
    fn iteration_order_is_lexicographic() {
        let mut shards = ShardTable::new();
        let mut world = WorldStore::new();
        world.insert(test_account(2, &mut shards)).unwrap();
        world.insert(test_account(1, &mut shards)).unwrap();
        let addrs: Vec<Address> = world.iter().map(|(a, _)| *a).collect();
        assert_eq!(addrs, vec![Address::from_index(1), Address::from_index(2)]);
    }
}
