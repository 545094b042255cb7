// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fls-relay: development push hub for floorsync.
//!
//! Accepts authenticated WebSocket connections, tracks per-connection group
//! membership, and re-broadcasts client invocations as server events. It
//! stands in for the production hub when testing the real-time channel.

pub mod logging;
pub mod server;
pub mod state;


pub use state::{Envelope, HubState};
