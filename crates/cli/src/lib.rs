// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! flsync - offline-first sync core for shop-floor production cards.
//!
//! This crate provides the engine behind the `floorsync` CLI: a durable
//! action queue that replays in order once the MES API is reachable, and a
//! real-time push channel that keeps client caches fresh.
//!
//! # Main Components
//!
//! - [`sync::SyncQueue`] - execute-or-queue submission and ordered replay
//! - [`sync::ConnectionState`] - observable reachability and sync status
//! - [`sync::RealtimeChannel`] - push connection with scheduled reconnect
//! - [`executors`] - REST executors for production-card actions
//! - [`Runtime`] - wires the pieces together for one process
//!
//! # Usage
//!
//! ```rust,ignore
//! use flsync::{Config, Runtime};
//! use fls_core::CardAction;
//!
//! let runtime = Runtime::open(Config::default(), &db_path, token)?;
//! runtime.refresh_online().await;
//! let submission = runtime.queue().submit(CardAction::start("C-100", "S-1")).await?;
//! ```

mod cli;
mod commands;
mod logging;

pub mod config;
pub mod env;
pub mod error;
pub mod executors;
pub mod reachability;
pub mod runtime;
pub mod sync;

pub use cli::{ActionKind, CacheCommand, Cli, Command, OutputFormat, QueueCommand, SubmitArgs};
pub use config::Config;
pub use error::{Error, Result};
pub use runtime::Runtime;

use commands::Context;

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(command: Command) -> Result<()> {
    match &command {
        Command::Run { log_file } => logging::setup_logging(log_file.as_deref(), "info"),
        _ => logging::setup_logging(None, "warn"),
    }
    let ctx = Context::load()?;

    match command {
        Command::Run { .. } => commands::run::run(&ctx).await,
        Command::Submit(args) => commands::submit::run(&ctx, args).await,
        Command::Sync => commands::sync::run(&ctx).await,
        Command::Status { output } => commands::status::run(&ctx, output).await,
        Command::Queue { command } => match command {
            QueueCommand::List { output } => commands::queue::list(&ctx, output),
            QueueCommand::Clear { yes } => commands::queue::clear(&ctx, yes),
        },
        Command::Cache { command } => match command {
            CacheCommand::Clear { tenant } => commands::cache::clear(&ctx, &tenant),
        },
    }
}
