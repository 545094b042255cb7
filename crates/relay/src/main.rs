// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fls-relay: development push hub for floorsync clients.

use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

use fls_relay::{logging, server, HubState};

/// fls-relay: push hub for floorsync real-time channels
#[derive(Parser, Debug)]
#[command(name = "fls-relay")]
#[command(about = "WebSocket push hub for floorsync real-time channels")]
struct Args {
    /// Address to bind the hub to
    #[arg(short, long, default_value = "0.0.0.0:7891")]
    bind: SocketAddr,

    /// Bearer token clients must present (any non-empty token when unset)
    #[arg(short, long)]
    token: Option<String>,

    /// Enable verbose logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    logging::init(args.verbose)?;

    info!("Starting fls-relay");
    info!("  Bind address: {}", args.bind);
    info!(
        "  Token: {}",
        if args.token.is_some() { "required" } else { "any" }
    );

    let state = HubState::new(args.token);
    server::run(args.bind, state).await?;

    Ok(())
}
