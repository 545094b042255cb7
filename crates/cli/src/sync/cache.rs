// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge to the client-side query cache.
//!
//! The cache itself lives elsewhere; the sync core only tells it which
//! query families went stale.

use fls_core::CacheKey;

/// A client-side cache that can drop stale query families.
pub trait QueryCache: Send + Sync {
    fn invalidate(&self, key: CacheKey);
}

/// Cache bridge for headless runs: records invalidations in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCache;

impl QueryCache for TracingCache {
    fn invalidate(&self, key: CacheKey) {
        tracing::info!(key = key.as_str(), "query cache invalidated");
    }
}
