// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! Error taxonomy for the harness.
//!
//! [`ScoutError`] covers fatal conditions: anything raised while loading a
//! scenario aborts the whole run. [`ExecFault`] covers the per-call outcomes
//! the Driver logs and continues past, mirroring the split between
//! `ExecutionError` (fatal) and the syscall `ControlFlow` (reported, not
//! fatal) that the teacher's syscall linker draws.

use crate::types::Address;

/// Fatal errors: loading a scenario or building the initial world aborts
/// the run when one of these is returned.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    #[error("failed to parse scenario file: {0}")]
    ScenarioParse(#[from] serde_yaml::Error),

    #[error("failed to read bytecode file {path}: {source}")]
    BytecodeRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate address {0:?} in world store")]
    DuplicateAddress(Address),

    #[error("unknown address {0:?}")]
    UnknownAddress(Address),

    #[error("shard id {shard_id} is out of range (NUM_SHARDS = {num_shards})")]
    ShardOutOfRange { shard_id: u64, num_shards: u64 },

    #[error("address {0:?} is already bound to its shard")]
    DuplicateAccountInShard(Address),
}

/// Non-fatal per-exec outcomes. The Driver logs these and moves on to the
/// next timeslot entry; state mutations performed by host callbacks before
/// the fault are preserved.
#[derive(thiserror::Error, Debug)]
pub enum ExecFault {
    #[error("failed to decode guest module: {0}")]
    Decode(String),

    #[error("guest module declares no linear memory")]
    NoGuestMemory,

    #[error("guest module has no zero-argument export named \"main\"")]
    MissingMainExport,

    #[error("guest trapped during execution: {0}")]
    Trap(#[from] wasmtime::Trap),

    #[error("wasmtime error while executing guest: {0}")]
    Runtime(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
pub type ExecResult<T> = std::result::Result<T, ExecFault>;
