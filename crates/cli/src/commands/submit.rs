// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::cli::SubmitArgs;
use crate::error::Result;
use crate::sync::Submission;

/// Execute or queue one card action.
pub async fn run(ctx: &Context, args: SubmitArgs) -> Result<()> {
    let action = args.into_action()?;
    let kind = action.kind();

    let runtime = ctx.runtime()?;
    runtime.refresh_online().await;
    let submission = runtime.queue().submit(action).await?;

    println!(
        "{}",
        describe(kind, &submission, runtime.state().pending_actions())
    );
    Ok(())
}

pub(crate) fn describe(kind: &str, submission: &Submission, pending: usize) -> String {
    match submission.queued_id {
        Some(id) if !submission.executed_immediately => {
            format!("queued {} as #{} ({} pending)", kind, id, pending)
        }
        _ => format!("executed {}", kind),
    }
}
