// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::Result;

/// Drop cached reference data for one tenant. The action queue is untouched.
pub fn clear(ctx: &Context, tenant: &str) -> Result<()> {
    let removed = ctx.open_store()?.clear_for_tenant(tenant)?;
    println!("Removed {} cached record(s) for tenant {}.", removed, tenant);
    Ok(())
}
