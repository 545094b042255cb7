// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST executors for production-card actions.
//!
//! Each action type maps to one POST against the MES API. A non-2xx answer
//! or a transport error fails the execution; the queue decides whether it
//! is retried.

use std::sync::Arc;
use std::time::Duration;

use fls_core::{kinds, CacheKey, CardAction, StepRef};
use reqwest::Url;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::sync::{ExecError, ExecResult, Registry};

/// Authenticated client for the MES REST API.
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid api base_url '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "invalid api base_url '{}': must be an http(s) URL",
                base_url
            )));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpApi {
            client,
            base,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The URL an action is posted to.
    pub fn endpoint(&self, action: &CardAction) -> std::result::Result<Url, ExecError> {
        let parts: Vec<&str> = match action {
            CardAction::StartStep { step } => step_path(step, "start"),
            CardAction::PauseStep { step, .. } => step_path(step, "pause"),
            CardAction::CompleteStep { step, .. } => step_path(step, "complete"),
            CardAction::ReportProblem { card_id, .. } => vec![card_id.as_str(), "problems"],
        };

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ExecError::InvalidPayload("base URL cannot take a path".into()))?
            .pop_if_empty()
            .push("production-cards")
            .extend(parts);
        Ok(url)
    }

    /// Request body for an action.
    pub fn body(action: &CardAction) -> Value {
        match action {
            CardAction::StartStep { .. } => json!({}),
            CardAction::PauseStep { reason, .. } => json!({ "reason": reason }),
            CardAction::CompleteStep { quantity, .. } => json!({ "quantity": quantity }),
            CardAction::ReportProblem {
                step_id,
                description,
                ..
            } => json!({ "stepId": step_id, "description": description }),
        }
    }

    /// POST `action`, which must carry the `kind` it was queued under.
    pub async fn execute(&self, kind: &str, action: CardAction) -> ExecResult {
        if action.kind() != kind {
            return Err(ExecError::InvalidPayload(format!(
                "{} payload queued as {}",
                action.kind(),
                kind
            )));
        }
        let url = self.endpoint(&action)?;

        let mut request = self.client.post(url.clone()).json(&Self::body(&action));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExecError::Request(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(kind, %url, %status, "action accepted");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(ExecError::Rejected {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.to_string()
            } else {
                message
            },
        })
    }
}

fn step_path<'a>(step: &'a StepRef, verb: &'a str) -> Vec<&'a str> {
    vec![step.card_id.as_str(), "steps", step.step_id.as_str(), verb]
}

/// Cache keys made stale when an action of `kind` succeeds.
pub fn invalidations(kind: &str) -> &'static [CacheKey] {
    match kind {
        kinds::COMPLETE_STEP => &[CacheKey::Cards, CacheKey::Orders],
        _ => &[CacheKey::Cards],
    }
}

/// Registry with an HTTP executor for every production-card action.
pub fn card_registry(api: Arc<HttpApi>) -> Registry<CardAction> {
    let mut registry = Registry::new();
    for kind in kinds::ALL {
        let api = Arc::clone(&api);
        registry.register(
            kind,
            move |action: CardAction| {
                let api = Arc::clone(&api);
                async move { api.execute(kind, action).await }
            },
            invalidations(kind),
        );
    }
    registry
}

#[cfg(test)]
#[path = "executors_tests.rs"]
mod tests;
