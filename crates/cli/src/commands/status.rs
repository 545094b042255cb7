// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use super::queue::format_action;
use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::reachability;
use fls_core::{QueuedAction, SyncStatus};

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub api: String,
    pub online: bool,
    pub pending: usize,
    pub sync_status: SyncStatus,
    pub actions: Vec<QueuedAction>,
}

/// Show reachability and queue health.
pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let actions = ctx.open_store()?.dequeue_all()?;
    let online = reachability::probe(&ctx.config.api.base_url, reachability::PROBE_TIMEOUT).await;
    let report = StatusReport {
        api: ctx.config.api.base_url.clone(),
        online,
        pending: actions.len(),
        sync_status: summarize(&actions),
        actions,
    };

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render(&report)),
    }
    Ok(())
}

/// Sync status as seen from the store alone.
pub(crate) fn summarize(actions: &[QueuedAction]) -> SyncStatus {
    if actions.is_empty() {
        SyncStatus::Synced
    } else {
        SyncStatus::Pending
    }
}

pub(crate) fn render(report: &StatusReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "API: {} ({})\n",
        report.api,
        if report.online { "reachable" } else { "unreachable" }
    ));
    out.push_str(&format!("Sync: {}\n", report.sync_status));
    out.push_str(&format!("Pending actions: {}\n", report.pending));
    for action in &report.actions {
        out.push_str(&format!("  {}\n", format_action(action)));
    }
    out
}
