// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Port 1 on loopback refuses connections, so the API is always offline.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:1/api";

/// A state directory whose config points at an unreachable API.
pub fn offline_state() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        format!(
            "[api]\nbase_url = \"{}\"\nrequest_timeout_secs = 1\n\n\
             [session]\ntenant_id = \"plant-a\"\nuser_id = \"op-7\"\n",
            UNREACHABLE_API
        ),
    )
    .unwrap();
    temp
}

/// The `floorsync` binary bound to `state` and isolated from the host env.
pub fn floorsync(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("floorsync");
    cmd.env("FLOORSYNC_STATE_DIR", state.path())
        .env_remove("FLOORSYNC_CONFIG")
        .env_remove("FLOORSYNC_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Queue a START_STEP action while offline.
pub fn queue_start(state: &TempDir, card: &str, step: &str) {
    floorsync(state)
        .args(["submit", "start", "-c", card, "-s", step])
        .assert()
        .success()
        .stdout(predicate::str::contains("queued START_STEP"));
}
