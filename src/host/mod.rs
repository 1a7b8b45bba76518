// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! The host ABI: the fixed `"env"` module every guest is linked against.
//!
//! Host functions close over the invoking account's state through
//! [`AccountState`], the data type attached to the per-call `wasmtime::Store`
//! (see `Account::exec`). This is the same role `InvocationData<K>` plays in
//! the teacher's `fvm/src/syscalls/mod.rs`, stripped of gas accounting this
//! harness has no model for.

mod abi;

use std::cell::RefCell;
use std::rc::Rc;

use wasmtime::{Linker, Memory};

use crate::types::StateRoot;

/// Data attached to the per-call `wasmtime::Store`. Everything a host
/// function needs to read or write is reachable from here.
pub struct AccountState {
    shard_id: u64,
    state_root: Rc<RefCell<StateRoot>>,
    calldata: Vec<u8>,
    /// Derived shard roots as of the start of this call — a snapshot, not a
    /// live view, since §4.5 specifies that cross-shard reads within a
    /// timeslot observe the *pre-slot* cached values.
    shard_roots: Rc<Vec<Option<StateRoot>>>,
    /// Set once the guest's first linear memory has been located.
    memory: Option<Memory>,
}

impl AccountState {
    pub fn new(
        shard_id: u64,
        state_root: Rc<RefCell<StateRoot>>,
        calldata: Vec<u8>,
        shard_roots: Rc<Vec<Option<StateRoot>>>,
    ) -> Self {
        AccountState {
            shard_id,
            state_root,
            calldata,
            shard_roots,
            memory: None,
        }
    }

    pub fn bind_memory(&mut self, memory: Memory) {
        self.memory = Some(memory);
    }
}

/// Registers every `eth2_*` host function under module name `"env"`.
pub fn link_env_module(linker: &mut Linker<AccountState>) -> anyhow::Result<()> {
    linker.func_wrap("env", "eth2_loadPreStateRoot", abi::load_pre_state_root)?;
    linker.func_wrap("env", "eth2_savePostStateRoot", abi::save_post_state_root)?;
    linker.func_wrap("env", "eth2_blockDataSize", abi::block_data_size)?;
    linker.func_wrap("env", "eth2_blockDataCopy", abi::block_data_copy)?;
    linker.func_wrap("env", "eth2_pushNewDeposit", abi::push_new_deposit)?;
    linker.func_wrap("env", "eth2_getShardId", abi::get_shard_id)?;
    linker.func_wrap("env", "eth2_getShardStateRoot", abi::get_shard_state_root)?;
    linker.func_wrap("env", "eth2_debugPrintMem", abi::debug_print_mem)?;
    Ok(())
}
