// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! The `scout` CLI: load a scenario, replay it, report pass/fail.
//!
//! Grounded on `tools/fvm-bench/src/main.rs`'s `exit_with_error` pattern,
//! adapted to the REDESIGN FLAG that a poststate mismatch is itself a
//! distinct, nonzero exit code rather than always exiting 0.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use scout::{driver, scenario::Scenario};

/// Replay a scenario file against a fresh execution environment.
#[derive(Parser, Debug)]
#[command(name = "scout", about = "Deterministic Wasm execution-environment replay harness")]
struct Cli {
    /// Path to the scenario YAML file.
    scenario: PathBuf,

    /// Increase log verbosity; repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let scenario = match Scenario::from_file(&cli.scenario) {
        Ok(scenario) => scenario,
        Err(err) => {
            log::error!("failed to load scenario: {err}");
            return ExitCode::from(1);
        }
    };

    let report = match driver::run(&scenario) {
        Ok(report) => report,
        Err(err) => {
            log::error!("run aborted: {err}");
            return ExitCode::from(1);
        }
    };

    if report.passed() {
        log::info!("all poststates matched");
        ExitCode::SUCCESS
    } else {
        log::error!("{} poststate mismatch(es)", report.mismatches.len());
        ExitCode::from(2)
    }
}
