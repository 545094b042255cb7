// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;

#[test]
fn list_shows_actions_in_replay_order() {
    let state = offline_state();
    queue_start(&state, "C-100", "S-1");
    queue_start(&state, "C-200", "S-2");

    let output = floorsync(&state).args(["queue", "list"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    let first = stdout.find("#1 START_STEP").unwrap();
    let second = stdout.find("#2 START_STEP").unwrap();
    assert!(first < second);
    assert!(stdout.contains("[plant-a/op-7]"));
}

#[test]
fn list_json_carries_payloads() {
    let state = offline_state();
    floorsync(&state)
        .args(["submit", "pause", "-c", "C-100", "-s", "S-1", "-r", "no material"])
        .assert()
        .success();

    let output = floorsync(&state)
        .args(["queue", "list", "--output", "json"])
        .output()
        .unwrap();
    let actions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(actions[0]["kind"], "PAUSE_STEP");
    assert_eq!(actions[0]["payload"]["card_id"], "C-100");
    assert_eq!(actions[0]["payload"]["reason"], "no material");
    assert_eq!(actions[0]["retry_count"], 0);
}

#[test]
fn clear_requires_confirmation() {
    let state = offline_state();
    queue_start(&state, "C-100", "S-1");

    floorsync(&state)
        .args(["queue", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Re-run with --yes"));

    floorsync(&state)
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 START_STEP"));
}

#[test]
fn clear_with_yes_empties_the_queue() {
    let state = offline_state();
    queue_start(&state, "C-100", "S-1");
    queue_start(&state, "C-100", "S-2");

    floorsync(&state)
        .args(["queue", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 queued action(s)."));

    floorsync(&state)
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queue is empty."));
}

#[test]
fn cache_clear_leaves_the_queue_alone() {
    let state = offline_state();
    queue_start(&state, "C-100", "S-1");

    floorsync(&state)
        .args(["cache", "clear", "plant-a"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Removed 0 cached record(s) for tenant plant-a.",
        ));

    floorsync(&state)
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 START_STEP"));
}

#[test]
fn cache_clear_rejects_blank_tenant() {
    let state = offline_state();

    floorsync(&state)
        .args(["cache", "clear", " "])
        .assert()
        .failure();
}
