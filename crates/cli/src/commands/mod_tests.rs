// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Test infrastructure for command testing.
//!
//! `TestContext` wraps a [`Context`] whose state directory is a temp dir and
//! whose API and hub point at a closed local port, so every command runs
//! against a real store while the network is down.

use super::Context;
use crate::cli::{ActionKind, OutputFormat, SubmitArgs};
use crate::config::Config;
use crate::error::Error;
use crate::sync::Submission;
use fls_core::{EntityKind, SyncStatus};
use serde_json::json;
use tempfile::TempDir;

pub struct TestContext {
    pub ctx: Context,
    _temp_dir: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = Config::default();
        config.api.base_url = format!("http://{addr}/api");
        config.realtime.url = format!("ws://{addr}/hub");

        TestContext {
            ctx: Context {
                state_dir: temp_dir.path().to_path_buf(),
                config,
                token: None,
            },
            _temp_dir: temp_dir,
        }
    }

    pub fn start_args(card: &str) -> SubmitArgs {
        SubmitArgs {
            kind: ActionKind::Start,
            card: card.to_string(),
            step: Some("S1".to_string()),
            reason: None,
            quantity: None,
            description: None,
        }
    }

    pub fn queued(&self) -> usize {
        self.ctx.open_store().unwrap().count().unwrap()
    }
}

#[tokio::test]
async fn submit_while_offline_queues() {
    let t = TestContext::new();

    super::submit::run(&t.ctx, TestContext::start_args("C1"))
        .await
        .unwrap();
    super::submit::run(&t.ctx, TestContext::start_args("C2"))
        .await
        .unwrap();

    assert_eq!(t.queued(), 2);
    assert!(t.ctx.db_path().exists());
}

#[tokio::test]
async fn submit_with_missing_field_queues_nothing() {
    let t = TestContext::new();
    let mut args = TestContext::start_args("C1");
    args.step = None;

    let err = super::submit::run(&t.ctx, args).await.unwrap_err();

    assert!(matches!(err, Error::FieldRequired { field: "--step", .. }));
    assert!(!t.ctx.db_path().exists());
}

#[test]
fn describe_submission() {
    let queued = Submission {
        executed_immediately: false,
        queued_id: Some(7),
    };
    let executed = Submission {
        executed_immediately: true,
        queued_id: None,
    };
    assert_eq!(
        super::submit::describe("START_STEP", &queued, 3),
        "queued START_STEP as #7 (3 pending)"
    );
    assert_eq!(
        super::submit::describe("START_STEP", &executed, 0),
        "executed START_STEP"
    );
}

#[tokio::test]
async fn sync_while_offline_is_an_error() {
    let t = TestContext::new();
    super::submit::run(&t.ctx, TestContext::start_args("C1"))
        .await
        .unwrap();

    let err = super::sync::run(&t.ctx).await.unwrap_err();

    assert!(matches!(err, Error::Offline { .. }));
    assert_eq!(t.queued(), 1);
}

#[tokio::test]
async fn queue_clear_requires_confirmation() {
    let t = TestContext::new();
    super::submit::run(&t.ctx, TestContext::start_args("C1"))
        .await
        .unwrap();

    super::queue::clear(&t.ctx, false).unwrap();
    assert_eq!(t.queued(), 1);

    super::queue::clear(&t.ctx, true).unwrap();
    assert_eq!(t.queued(), 0);
}

#[tokio::test]
async fn queue_list_and_status_read_the_store() {
    let t = TestContext::new();
    super::submit::run(&t.ctx, TestContext::start_args("C1"))
        .await
        .unwrap();

    super::queue::list(&t.ctx, OutputFormat::Text).unwrap();
    super::queue::list(&t.ctx, OutputFormat::Json).unwrap();
    super::status::run(&t.ctx, OutputFormat::Json).await.unwrap();
}

#[test]
fn format_action_includes_retry_details() {
    let store = fls_core::Store::open_in_memory().unwrap();
    let id = store
        .enqueue("START_STEP", &json!({ "card_id": "C1" }), "acme", "ana")
        .unwrap();
    store.update_retry(id, 2, Some("503 Service Unavailable")).unwrap();
    let action = store.get(id).unwrap().unwrap();

    let line = super::queue::format_action(&action);

    assert!(line.starts_with(&format!("#{} START_STEP", id)));
    assert!(line.contains("[acme/ana]"));
    assert!(line.contains("2 retries"));
    assert!(line.ends_with("last error: 503 Service Unavailable"));
}

#[test]
fn status_render_and_summary() {
    use super::status::{render, summarize, StatusReport};

    assert_eq!(summarize(&[]), SyncStatus::Synced);

    let store = fls_core::Store::open_in_memory().unwrap();
    store.enqueue("START_STEP", &json!({}), "t", "u").unwrap();
    let actions = store.dequeue_all().unwrap();
    assert_eq!(summarize(&actions), SyncStatus::Pending);

    let report = StatusReport {
        api: "http://mes/api".into(),
        online: false,
        pending: actions.len(),
        sync_status: summarize(&actions),
        actions,
    };
    let text = render(&report);
    assert!(text.starts_with("API: http://mes/api (unreachable)\n"));
    assert!(text.contains("Sync: pending\n"));
    assert!(text.contains("Pending actions: 1\n"));
}

#[test]
fn cache_clear_only_touches_one_tenant() {
    let t = TestContext::new();
    {
        let store = t.ctx.open_store().unwrap();
        store
            .put(EntityKind::Card, "acme", "C1", &json!({ "id": "C1" }))
            .unwrap();
        store
            .put(EntityKind::Card, "other", "C9", &json!({ "id": "C9" }))
            .unwrap();
        store.enqueue("START_STEP", &json!({}), "acme", "u").unwrap();
    }

    super::cache::clear(&t.ctx, "acme").unwrap();

    let store = t.ctx.open_store().unwrap();
    let acme: Vec<serde_json::Value> = store.get_all(EntityKind::Card, "acme").unwrap();
    let other: Vec<serde_json::Value> = store.get_all(EntityKind::Card, "other").unwrap();
    assert!(acme.is_empty());
    assert_eq!(other.len(), 1);
    assert_eq!(store.count().unwrap(), 1);
}
