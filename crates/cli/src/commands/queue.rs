// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue inspection and reset.

use fls_core::QueuedAction;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;

/// List queued actions in replay order.
pub fn list(ctx: &Context, output: OutputFormat) -> Result<()> {
    let actions = ctx.open_store()?.dequeue_all()?;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&actions)?),
        OutputFormat::Text => {
            if actions.is_empty() {
                println!("Queue is empty.");
            }
            for action in &actions {
                println!("{}", format_action(action));
            }
        }
    }
    Ok(())
}

/// Drop every queued action.
pub fn clear(ctx: &Context, yes: bool) -> Result<()> {
    let runtime = ctx.runtime()?;
    let count = runtime.queue().pending()?.len();
    if count == 0 {
        println!("Queue is empty.");
        return Ok(());
    }
    if !yes {
        println!(
            "{} queued action(s) would be lost. Re-run with --yes to clear.",
            count
        );
        return Ok(());
    }
    runtime.queue().clear()?;
    println!("Cleared {} queued action(s).", count);
    Ok(())
}

/// One-line summary of a queued action.
pub(crate) fn format_action(action: &QueuedAction) -> String {
    let mut line = format!(
        "#{} {} {} [{}/{}] queued {}",
        action.id,
        action.kind,
        action.payload,
        action.tenant_id,
        action.user_id,
        action.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    if action.retry_count > 0 {
        line.push_str(&format!(", {} retries", action.retry_count));
    }
    if let Some(err) = &action.last_error {
        line.push_str(&format!(", last error: {}", err));
    }
    line
}
