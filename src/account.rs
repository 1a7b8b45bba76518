// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! An [`Account`] is one execution-environment instance: immutable code and
//! address, a mutable state root, and the transient bindings that exist
//! only for the duration of an active [`Account::exec`] call.

use std::cell::RefCell;
use std::rc::Rc;

use wasmtime::{Engine, Instance, Linker, Module, Store};

use crate::error::{ExecFault, ExecResult, ScoutError};
use crate::host::{self, AccountState};
use crate::shard::ShardTable;
use crate::types::{Address, StateRoot};

/// One execution-environment instance. `address` and `bytecode` never
/// change after construction (I6); `state_root` is the only field a guest
/// call can mutate, and only indirectly, through the host ABI.
pub struct Account {
    pub address: Address,
    pub shard_id: u64,
    pub bytecode: Vec<u8>,
    state_root: Rc<RefCell<StateRoot>>,
}

/// Outcome of one [`Account::exec`] call. A trap or ABI-contract violation
/// is reported here rather than propagated — the Driver logs it and moves
/// on to the next timeslot entry (§4.3, §7).
pub enum ExecOutcome {
    /// The guest ran to completion (possibly returning values we don't
    /// otherwise use; `main` is resolved as zero-result).
    Completed,
    /// The call did not complete cleanly; `state_root` mutations performed
    /// by host callbacks before the fault still persisted.
    Faulted(ExecFault),
}

impl Account {
    /// Constructs a new account and registers it into `shards`.
    ///
    /// # Errors
    /// - [`ScoutError::ShardOutOfRange`] if `shard_id >= NUM_SHARDS` (I2).
    /// - [`ScoutError::DuplicateAccountInShard`] if this address is already
    ///   bound to that shard.
    pub fn new(
        address: Address,
        shard_id: u64,
        bytecode: Vec<u8>,
        state_root: StateRoot,
        shards: &mut ShardTable,
    ) -> Result<Self, ScoutError> {
        if !ShardTable::in_range(shard_id) {
            return Err(ScoutError::ShardOutOfRange {
                shard_id,
                num_shards: crate::shard::NUM_SHARDS,
            });
        }
        if !shards.bind(shard_id, address) {
            return Err(ScoutError::DuplicateAccountInShard(address));
        }
        Ok(Account {
            address,
            shard_id,
            bytecode,
            state_root: Rc::new(RefCell::new(state_root)),
        })
    }

    pub fn state_root(&self) -> StateRoot {
        *self.state_root.borrow()
    }

    /// Runs `calldata` against this account's guest bytecode.
    ///
    /// Per §4.3: a fresh engine/store is created for every call (the
    /// isolation boundary, §5), the host module `"env"` is registered
    /// closing over this account's state, the guest is decoded and
    /// instantiated, its first linear memory is captured, and its
    /// zero-argument `main` export is invoked. Transient bindings are
    /// always cleared before returning, whether or not the call succeeded.
    pub fn exec(&mut self, calldata: &[u8], shards: &ShardTable) -> ExecOutcome {
        log::trace!(
            "exec(addr={:?}, calldata={})",
            self.address,
            hex::encode(calldata)
        );

        match self.exec_inner(calldata, shards) {
            Ok(()) => ExecOutcome::Completed,
            Err(fault) => {
                log::warn!("exec(addr={:?}) faulted: {}", self.address, fault);
                ExecOutcome::Faulted(fault)
            }
        }
    }

    fn exec_inner(&mut self, calldata: &[u8], shards: &ShardTable) -> ExecResult<()> {
        let engine = Engine::default();
        let mut linker: Linker<AccountState> = Linker::new(&engine);
        host::link_env_module(&mut linker).map_err(ExecFault::Runtime)?;

        let state = AccountState::new(
            self.shard_id,
            Rc::clone(&self.state_root),
            calldata.to_vec(),
            shards.snapshot(),
        );
        let mut store = Store::new(&engine, state);

        let module = Module::new(&engine, &self.bytecode)
            .map_err(|e| ExecFault::Decode(format!("{e:#}")))?;

        // `Linker::instantiate` runs data/elem segment initialization and
        // the start function as part of instantiation.
        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(downcast_trap)?;

        bind_memory(&instance, &mut store)?;

        call_main(&instance, &mut store)
    }
}

/// Resolves the guest's `main` export per §4.3 step 6: zero-argument, and
/// zero-result *or ignored-result* — `wasmtime`'s typed-func lookup checks
/// the whole signature including results, so a `main` that returns a value
/// would be misreported as missing one. Look it up untyped instead, reject
/// only on nonzero params, and discard whatever results come back.
fn call_main(instance: &Instance, store: &mut Store<AccountState>) -> ExecResult<()> {
    let main = instance
        .get_func(&mut *store, "main")
        .ok_or(ExecFault::MissingMainExport)?;
    let ty = main.ty(&*store);
    if ty.params().len() != 0 {
        return Err(ExecFault::MissingMainExport);
    }
    let mut results = vec![wasmtime::Val::I32(0); ty.results().len()];
    main.call(&mut *store, &[], &mut results)
        .map_err(downcast_trap)
}

fn bind_memory(instance: &Instance, store: &mut Store<AccountState>) -> ExecResult<()> {
    let memory = instance
        .get_memory(&mut *store, "memory")
        .ok_or(ExecFault::NoGuestMemory)?;
    store.data_mut().bind_memory(memory);
    Ok(())
}

fn downcast_trap(err: anyhow::Error) -> ExecFault {
    match err.downcast::<wasmtime::Trap>() {
        Ok(trap) => ExecFault::Trap(trap),
        Err(err) => ExecFault::Runtime(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_out_of_range_shard() {
        let mut shards = ShardTable::new();
        let err = Account::new(
            Address::from_index(1),
            crate::shard::NUM_SHARDS,
            vec![],
            StateRoot::zero(),
            &mut shards,
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::ShardOutOfRange { .. }));
    }

    #[test]
    fn construction_rejects_duplicate_in_shard() {
        let mut shards = ShardTable::new();
        Account::new(
            Address::from_index(1),
            0,
            vec![],
            StateRoot::zero(),
            &mut shards,
        )
        .unwrap();
        let err = Account::new(
            Address::from_index(1),
            0,
            vec![],
            StateRoot::zero(),
            &mut shards,
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::DuplicateAccountInShard(_)));
    }

    #[test]
    fn decode_error_is_reported_not_fatal() {
        let mut shards = ShardTable::new();
        let mut account = Account::new(
            Address::from_index(1),
            0,
            b"not a wasm module".to_vec(),
            StateRoot::zero(),
            &mut shards,
        )
        .unwrap();
        match account.exec(&[], &shards) {
            ExecOutcome::Faulted(ExecFault::Decode(_)) => {}
            _ => panic!("expected a decode fault"),
        }
    }

    #[test]
    fn main_export_with_nonempty_result_is_accepted_and_ignored() {
        // §4.3 step 6: `main` is zero-argument, and zero-result *or
        // ignored-result*. A typed-func lookup of `fn() -> ()` would reject
        // this module outright; `call_main` must accept it and discard the
        // returned value.
        let wat = r#"
(module
  (func $main (export "main") (result i32) (i32.const 7))
  (memory (export "memory") 1))
"#;
        let bytecode = wat::parse_str(wat).expect("valid wat fixture");
        let mut shards = ShardTable::new();
        let mut account = Account::new(
            Address::from_index(1),
            0,
            bytecode,
            StateRoot::zero(),
            &mut shards,
        )
        .unwrap();
        match account.exec(&[], &shards) {
            ExecOutcome::Completed => {}
            ExecOutcome::Faulted(fault) => panic!("expected success, got {fault}"),
        }
    }
}
