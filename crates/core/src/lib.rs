// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fls-core: Shared library for the floorsync offline sync core
//!
//! This crate provides the data model, durable queue storage, and push
//! protocol types used by both the floorsync CLI and the fls-relay hub.

pub mod action;
pub mod error;
pub mod event;
pub mod protocol;
pub mod status;
pub mod store;

pub use action::{kinds, CardAction, QueuedAction, StepRef};
pub use error::{Error, Result};
pub use event::{CacheKey, PushEvent};
pub use status::{ConnectionStatus, SyncStatus};
pub use store::{EntityKind, QueueEntry, Store};
