// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::env::vars;

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `default_filter`. With a log file, output goes there
/// without ANSI colors; if it cannot be opened, logging falls back to stderr.
pub fn setup_logging(log_file: Option<&Path>, default_filter: &str) {
    let filter =
        EnvFilter::try_from_env(vars::RUST_LOG).unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("warning: cannot open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    // A subscriber may already be installed when embedded; keep it.
    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}
