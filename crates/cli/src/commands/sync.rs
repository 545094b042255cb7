// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::{Error, Result};

/// Run one replay pass.
pub async fn run(ctx: &Context) -> Result<()> {
    let runtime = ctx.runtime()?;
    if !runtime.refresh_online().await {
        return Err(Error::Offline {
            url: ctx.config.api.base_url.clone(),
        });
    }

    let report = runtime.queue().process_queue().await?;
    println!(
        "processed: {}, failed: {}, pending: {}",
        report.processed,
        report.failed,
        runtime.state().pending_actions()
    );
    Ok(())
}
