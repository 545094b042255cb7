// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync core.
//!
//! Queues user actions durably while offline, replays them in order once
//! the network is back, and keeps a push channel open for server events.
//!
//! # Architecture
//!
//! ```text
//!   submit ──►┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//!             │  SyncQueue  │────►│  Registry   │────►│  REST API   │
//!             │  (engine)   │     │ (executors) │     │             │
//!             └─────────────┘     └─────────────┘     └─────────────┘
//!               │        │
//!               ▼        ▼
//!     ┌─────────────┐  ┌──────────────────┐  ┌─────────────┐
//!     │    Store    │  │ ConnectionState  │◄─│  Realtime   │◄── push hub
//!     │  (SQLite)   │  │  (observable)    │  │  Channel    │
//!     └─────────────┘  └──────────────────┘  └─────────────┘
//!                                                  │
//!                             QueryCache ◄─────────┘ (and engine)
//! ```
//!
//! # Features
//!
//! - Execute-or-queue submission that never drops an action
//! - Strictly ordered replay with bounded retries and eviction
//! - Auto sync on reconnect, plus a periodic re-check
//! - Push channel with scheduled reconnect and group re-join
//! - Injectable transport, executors and cache for testing

mod cache;
mod channel;
mod engine;
mod registry;
mod state;
mod transport;

pub use cache::{QueryCache, TracingCache};
pub use channel::{ChannelConfig, ChannelError, HandlerId, RealtimeChannel, RECONNECT_DELAYS_MS};
pub use engine::{ProcessReport, Session, Submission, SyncError, SyncQueue, MAX_RETRIES};
pub use registry::{ExecError, ExecResult, Executor, Registry};
pub use state::{ConnectionState, Snapshot, StateChange};
pub use transport::{
    BoxFuture, Connector, Transport, TransportError, TransportResult, WebSocketConnector,
    WebSocketTransport,
};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod channel_tests;
