// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::Result;

/// Run the sync service until Ctrl-C.
pub async fn run(ctx: &Context) -> Result<()> {
    let runtime = ctx.runtime()?;
    tracing::info!(state_dir = %ctx.state_dir.display(), "state directory");

    runtime
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for Ctrl-C");
            }
        })
        .await
}
