// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued actions and the production-card action payloads.
//!
//! A [`QueuedAction`] is a user mutation that has been durably recorded but
//! not yet confirmed by the server. The queue itself treats the payload as
//! opaque; only the executor registered for an action's `kind` interprets it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action type tags for the production-card domain.
///
/// The set is open: any string may be queued, and unknown tags are
/// evicted at replay time.
pub mod kinds {
    pub const START_STEP: &str = "START_STEP";
    pub const PAUSE_STEP: &str = "PAUSE_STEP";
    pub const COMPLETE_STEP: &str = "COMPLETE_STEP";
    pub const REPORT_PROBLEM: &str = "REPORT_PROBLEM";

    /// All tags understood by the bundled executors.
    pub const ALL: [&str; 4] = [START_STEP, PAUSE_STEP, COMPLETE_STEP, REPORT_PROBLEM];
}

/// A durably queued mutation awaiting remote execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction<P = serde_json::Value> {
    /// Store-assigned identifier, monotonic and never reused.
    pub id: i64,
    /// Action type tag used to resolve the executor.
    pub kind: String,
    pub payload: P,
    pub created_at: DateTime<Utc>,
    /// Failed execution attempts so far.
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub tenant_id: String,
    pub user_id: String,
}

impl<P> QueuedAction<P> {
    /// Converts the payload, keeping every other field.
    pub fn map_payload<Q, E>(self, f: impl FnOnce(P) -> Result<Q, E>) -> Result<QueuedAction<Q>, E> {
        Ok(QueuedAction {
            id: self.id,
            kind: self.kind,
            payload: f(self.payload)?,
            created_at: self.created_at,
            retry_count: self.retry_count,
            last_error: self.last_error,
            tenant_id: self.tenant_id,
            user_id: self.user_id,
        })
    }
}

/// Reference to one step of a production card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRef {
    pub card_id: String,
    pub step_id: String,
}

/// A user mutation on a production card.
///
/// Serialized with an `action` tag so a stored payload is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardAction {
    /// Begin work on a step.
    StartStep {
        #[serde(flatten)]
        step: StepRef,
    },
    /// Pause work on a step.
    PauseStep {
        #[serde(flatten)]
        step: StepRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Finish a step, optionally recording the produced quantity.
    CompleteStep {
        #[serde(flatten)]
        step: StepRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quantity: Option<u32>,
    },
    /// Flag a problem on a card.
    ReportProblem {
        card_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step_id: Option<String>,
        description: String,
    },
}

impl CardAction {
    /// Creates a START_STEP action.
    pub fn start(card_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        CardAction::StartStep {
            step: StepRef {
                card_id: card_id.into(),
                step_id: step_id.into(),
            },
        }
    }

    /// Creates a PAUSE_STEP action.
    pub fn pause(
        card_id: impl Into<String>,
        step_id: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        CardAction::PauseStep {
            step: StepRef {
                card_id: card_id.into(),
                step_id: step_id.into(),
            },
            reason,
        }
    }

    /// Creates a COMPLETE_STEP action.
    pub fn complete(
        card_id: impl Into<String>,
        step_id: impl Into<String>,
        quantity: Option<u32>,
    ) -> Self {
        CardAction::CompleteStep {
            step: StepRef {
                card_id: card_id.into(),
                step_id: step_id.into(),
            },
            quantity,
        }
    }

    /// Creates a REPORT_PROBLEM action.
    pub fn report_problem(
        card_id: impl Into<String>,
        step_id: Option<String>,
        description: impl Into<String>,
    ) -> Self {
        CardAction::ReportProblem {
            card_id: card_id.into(),
            step_id,
            description: description.into(),
        }
    }

    /// Returns the action type tag this payload is queued under.
    pub fn kind(&self) -> &'static str {
        match self {
            CardAction::StartStep { .. } => kinds::START_STEP,
            CardAction::PauseStep { .. } => kinds::PAUSE_STEP,
            CardAction::CompleteStep { .. } => kinds::COMPLETE_STEP,
            CardAction::ReportProblem { .. } => kinds::REPORT_PROBLEM,
        }
    }

    /// Returns the card this action targets.
    pub fn card_id(&self) -> &str {
        match self {
            CardAction::StartStep { step }
            | CardAction::PauseStep { step, .. }
            | CardAction::CompleteStep { step, .. } => &step.card_id,
            CardAction::ReportProblem { card_id, .. } => card_id,
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
