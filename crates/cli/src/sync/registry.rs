// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch table from action type to the remote call that fulfills it.

use std::collections::BTreeMap;
use std::future::Future;

use fls_core::CacheKey;

use super::transport::BoxFuture;

/// Failure of a single remote execution.
///
/// The queue engine treats every variant as retryable; only an unknown
/// action type is permanent.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server rejected action ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

pub type ExecResult = Result<(), ExecError>;

/// A remote operation taking an action payload.
pub trait Executor<P>: Send + Sync {
    fn execute(&self, payload: P) -> BoxFuture<'static, ExecResult>;
}

impl<P, F, Fut> Executor<P> for F
where
    F: Fn(P) -> Fut + Send + Sync,
    Fut: Future<Output = ExecResult> + Send + 'static,
{
    fn execute(&self, payload: P) -> BoxFuture<'static, ExecResult> {
        Box::pin(self(payload))
    }
}

struct Entry<P> {
    executor: Box<dyn Executor<P>>,
    invalidates: Vec<CacheKey>,
}

/// Maps action types to executors.
pub struct Registry<P> {
    entries: BTreeMap<String, Entry<P>>,
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<P> Registry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `executor` for `kind`, replacing any earlier registration.
    ///
    /// `invalidates` lists the cache keys made stale when it succeeds.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        executor: impl Executor<P> + 'static,
        invalidates: &[CacheKey],
    ) -> &mut Self {
        self.entries.insert(
            kind.into(),
            Entry {
                executor: Box::new(executor),
                invalidates: invalidates.to_vec(),
            },
        );
        self
    }

    pub fn resolve(&self, kind: &str) -> Option<&dyn Executor<P>> {
        self.entries.get(kind).map(|e| e.executor.as_ref())
    }

    pub fn invalidations(&self, kind: &str) -> &[CacheKey] {
        self.entries
            .get(kind)
            .map(|e| e.invalidates.as_slice())
            .unwrap_or(&[])
    }

    /// Registered action types in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
