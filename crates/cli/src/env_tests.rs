// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::path::PathBuf;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::FLOORSYNC_STATE_DIR, "FLOORSYNC_STATE_DIR");
    assert_eq!(vars::FLOORSYNC_CONFIG, "FLOORSYNC_CONFIG");
    assert_eq!(vars::FLOORSYNC_TOKEN, "FLOORSYNC_TOKEN");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(vars::RUST_LOG, "RUST_LOG");
}

#[test]
fn explicit_override_wins() {
    let dir = resolve_state_dir(
        Some(PathBuf::from("/tmp/fs")),
        Some(PathBuf::from("/xdg")),
        Some(PathBuf::from("/home/op")),
    );
    assert_eq!(dir, PathBuf::from("/tmp/fs"));
}

#[test]
fn xdg_state_home_is_namespaced() {
    let dir = resolve_state_dir(None, Some(PathBuf::from("/xdg")), Some(PathBuf::from("/home/op")));
    assert_eq!(dir, PathBuf::from("/xdg/floorsync"));
}

#[test]
fn falls_back_to_home() {
    let dir = resolve_state_dir(None, None, Some(PathBuf::from("/home/op")));
    assert_eq!(dir, PathBuf::from("/home/op/.local/state/floorsync"));
}

#[test]
fn falls_back_to_relative_without_home() {
    let dir = resolve_state_dir(None, None, None);
    assert_eq!(dir, PathBuf::from(".local/state/floorsync"));
}
