// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! The eight `eth2_*` host functions, per §4.4.
//!
//! All offsets/lengths are treated as unsigned; bounds checking is the Wasm
//! engine's responsibility (an out-of-bounds access traps the guest, it is
//! never validated here — matching `rt-vm.rs`'s `get_memory` +
//! `Memory::read`/`write` idiom, which relies on wasmtime's own bounds
//! checks rather than pre-flighting offsets by hand).

use wasmtime::{Caller, Memory};

use super::AccountState;

fn memory(caller: &mut Caller<'_, AccountState>) -> wasmtime::Result<Memory> {
    caller
        .data()
        .memory
        .ok_or_else(|| wasmtime::Error::msg("guest memory not yet available"))
}

/// `eth2_loadPreStateRoot(offset) -> ()`: copy the 32 bytes of the account's
/// `state_root` into guest memory at `offset`.
pub fn load_pre_state_root(mut caller: Caller<'_, AccountState>, offset: u32) -> wasmtime::Result<()> {
    let memory = memory(&mut caller)?;
    let root = *caller.data().state_root.borrow();
    log::trace!(
        "eth2_loadPreStateRoot(offset={offset}) root={}",
        hex::encode(root.as_bytes())
    );
    memory.write(&mut caller, offset as usize, root.as_bytes())?;
    Ok(())
}

/// `eth2_savePostStateRoot(offset) -> ()`: copy 32 bytes from guest memory
/// at `offset` into the account's `state_root`.
pub fn save_post_state_root(mut caller: Caller<'_, AccountState>, offset: u32) -> wasmtime::Result<()> {
    let memory = memory(&mut caller)?;
    let mut buf = [0u8; 32];
    memory.read(&caller, offset as usize, &mut buf)?;
    log::trace!(
        "eth2_savePostStateRoot(offset={offset}) root={}",
        hex::encode(buf)
    );
    *caller.data().state_root.borrow_mut() = crate::types::StateRoot(buf);
    Ok(())
}

/// `eth2_blockDataSize() -> i32`: the length of the current call's calldata.
pub fn block_data_size(caller: Caller<'_, AccountState>) -> u32 {
    let len = caller.data().calldata.len() as u32;
    log::trace!("eth2_blockDataSize() -> {len}");
    len
}

/// `eth2_blockDataCopy(mem_off, src_off, len) -> ()`: copy `len` bytes from
/// `calldata[src_off .. src_off+len]` into guest memory at `mem_off`.
pub fn block_data_copy(
    mut caller: Caller<'_, AccountState>,
    mem_off: u32,
    src_off: u32,
    len: u32,
) -> wasmtime::Result<()> {
    let memory = memory(&mut caller)?;
    let src_off = src_off as usize;
    let len = len as usize;
    let slice = caller
        .data()
        .calldata
        .get(src_off..src_off + len)
        .ok_or_else(|| wasmtime::Error::msg("calldata slice out of bounds"))?
        .to_vec();
    log::trace!(
        "eth2_blockDataCopy(mem_off={mem_off}, src_off={src_off}, len={len}) bytes={}",
        hex::encode(&slice)
    );
    memory.write(&mut caller, mem_off as usize, &slice)?;
    Ok(())
}

/// `eth2_pushNewDeposit(offset, len) -> ()`: reserved, must be accepted and
/// must no-op besides a debug log.
pub fn push_new_deposit(offset: u32, len: u32) {
    log::debug!("eth2_pushNewDeposit(offset={offset}, len={len}) — reserved no-op");
}

/// `eth2_getShardId() -> i64`: the invoking account's shard id.
pub fn get_shard_id(caller: Caller<'_, AccountState>) -> u64 {
    caller.data().shard_id
}

/// `eth2_getShardStateRoot(shard_id, offset) -> i32`: if `shard_id` is in
/// range and that shard currently has exactly one bound account, copy its
/// derived root into guest memory at `offset` and return `0`. Otherwise
/// write nothing and return `1`.
pub fn get_shard_state_root(
    mut caller: Caller<'_, AccountState>,
    shard_id: u64,
    offset: u32,
) -> wasmtime::Result<u32> {
    log::trace!("eth2_getShardStateRoot(shard_id={shard_id}, offset={offset})");
    let root = caller
        .data()
        .shard_roots
        .get(shard_id as usize)
        .copied()
        .flatten();

    match root {
        Some(root) => {
            let memory = memory(&mut caller)?;
            memory.write(&mut caller, offset as usize, root.as_bytes())?;
            Ok(0)
        }
        None => Ok(1),
    }
}

/// `eth2_debugPrintMem(offset, len) -> ()`: best-effort debug dump, no
/// effect on state.
pub fn debug_print_mem(mut caller: Caller<'_, AccountState>, offset: u32, len: u32) -> wasmtime::Result<()> {
    let memory = memory(&mut caller)?;
    let end = offset as usize + len as usize;
    if let Some(bytes) = memory.data(&caller).get(offset as usize..end) {
        log::debug!("eth2_debugPrintMem({offset}, {len}) = {}", hex::encode(bytes));
    }
    Ok(())
}
