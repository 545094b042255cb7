// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use args::{ActionKind, SubmitArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "floorsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first sync for shop-floor production cards")]
#[command(
    long_about = "Offline-first sync for shop-floor production cards.\n\n\
    Actions taken without a network are queued durably and replayed in order \
    once the MES API is reachable again."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the sync service until interrupted
    #[command(after_help = "\
Examples:
  floorsync run                          Log to stderr
  floorsync run --log-file sync.log      Log to a file")]
    Run {
        /// Write logs to this file instead of stderr
        #[arg(long, value_name = "path")]
        log_file: Option<PathBuf>,
    },

    /// Execute a card action now, or queue it while offline
    #[command(after_help = "\
Examples:
  floorsync submit start -c C-100 -s S-1
  floorsync submit pause -c C-100 -s S-1 -r \"material missing\"
  floorsync submit complete -c C-100 -s S-1 -q 40
  floorsync submit problem -c C-100 -d \"spindle overheating\"")]
    Submit(SubmitArgs),

    /// Replay the queue once if the API is reachable
    Sync,

    /// Show connectivity and queue status
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Inspect or reset the action queue
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },

    /// Manage cached reference data
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List queued actions in replay order
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },
    /// Drop every queued action
    Clear {
        /// Skip the confirmation requirement
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Remove cached cards, steps and departments for a tenant
    Clear {
        /// Tenant whose cache is dropped
        #[arg(value_parser = non_empty_string)]
        tenant: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
