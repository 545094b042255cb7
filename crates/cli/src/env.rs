// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by floorsync are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `FLOORSYNC_STATE_DIR` if set.
pub fn state_dir_override() -> Option<PathBuf> {
    std::env::var(vars::FLOORSYNC_STATE_DIR)
        .ok()
        .map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(vars::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// Returns the value of `FLOORSYNC_CONFIG` if set.
pub fn config_path_override() -> Option<PathBuf> {
    std::env::var(vars::FLOORSYNC_CONFIG).ok().map(PathBuf::from)
}

/// Returns the bearer credential from `FLOORSYNC_TOKEN`, ignoring blanks.
pub fn token() -> Option<String> {
    std::env::var(vars::FLOORSYNC_TOKEN)
        .ok()
        .filter(|t| !t.trim().is_empty())
}

/// Directory holding the durable store, config and logs.
pub fn state_dir() -> PathBuf {
    resolve_state_dir(state_dir_override(), xdg_state_home(), dirs::home_dir())
}

/// Picks the state directory: explicit override, then XDG, then `~/.local/state`.
pub fn resolve_state_dir(
    explicit: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Some(dir) = xdg_state_home {
        return dir.join("floorsync");
    }
    home.map(|h| h.join(".local/state/floorsync"))
        .unwrap_or_else(|| PathBuf::from(".local/state/floorsync"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
