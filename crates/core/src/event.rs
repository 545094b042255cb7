// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server-pushed domain events and the cached collections they affect.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cached collection on the client that may need refetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKey {
    Cards,
    Orders,
    Steps,
    Departments,
}

impl CacheKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Cards => "cards",
            CacheKey::Orders => "orders",
            CacheKey::Steps => "steps",
            CacheKey::Departments => "departments",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain events the real-time channel knows how to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushEvent {
    CardCreated,
    CardStarted,
    CardPaused,
    CardCompleted,
    OrderCreated,
    OrderCompleted,
}

impl PushEvent {
    /// Every known event.
    pub const ALL: [PushEvent; 6] = [
        PushEvent::CardCreated,
        PushEvent::CardStarted,
        PushEvent::CardPaused,
        PushEvent::CardCompleted,
        PushEvent::OrderCreated,
        PushEvent::OrderCompleted,
    ];

    /// Returns the wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::CardCreated => "CardCreated",
            PushEvent::CardStarted => "CardStarted",
            PushEvent::CardPaused => "CardPaused",
            PushEvent::CardCompleted => "CardCompleted",
            PushEvent::OrderCreated => "OrderCreated",
            PushEvent::OrderCompleted => "OrderCompleted",
        }
    }

    /// Looks up a known event by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Returns the cached collections made stale by this event.
    pub fn invalidates(&self) -> &'static [CacheKey] {
        match self {
            PushEvent::CardCreated | PushEvent::CardStarted | PushEvent::CardPaused => {
                &[CacheKey::Cards]
            }
            // Completing a card moves its order's progress.
            PushEvent::CardCompleted => &[CacheKey::Cards, CacheKey::Orders],
            PushEvent::OrderCreated | PushEvent::OrderCompleted => {
                &[CacheKey::Orders, CacheKey::Cards]
            }
        }
    }
}

impl fmt::Display for PushEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
