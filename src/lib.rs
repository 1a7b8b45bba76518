// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! `scout` is a deterministic, sandboxed replay harness: it loads a set of
//! WebAssembly execution environments bound to a fixed shard table, replays
//! a sequence of timeslots against them, and checks the resulting state
//! roots against a declared set of expectations.
//!
//! Every guest call runs in a fresh `wasmtime` engine and store — see
//! [`account::Account::exec`] — so no state leaks between calls except
//! through the host ABI's explicit load/save functions.

pub mod account;
pub mod driver;
pub mod error;
pub mod host;
pub mod scenario;
pub mod shard;
pub mod types;
pub mod world;

pub use driver::{run, Mismatch, RunReport, World};
pub use error::{ExecFault, ScoutError};
pub use scenario::Scenario;
