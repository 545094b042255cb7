// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cache;
pub mod queue;
pub mod run;
pub mod status;
pub mod submit;
pub mod sync;

use std::path::PathBuf;

use fls_core::Store;

use crate::config::{config_path, db_path, Config};
use crate::env;
use crate::error::Result;
use crate::runtime::Runtime;

/// Everything a command needs from the environment.
pub struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
    pub token: Option<String>,
}

impl Context {
    /// Resolve the state directory, load its config, and read the credential.
    pub fn load() -> Result<Self> {
        let state_dir = env::state_dir();
        let config = Config::load(&config_path(&state_dir))?;
        Ok(Context {
            state_dir,
            config,
            token: env::token(),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        db_path(&self.state_dir)
    }

    /// Open the durable store without building the engine.
    pub fn open_store(&self) -> Result<Store> {
        Ok(Store::open(&self.db_path())?)
    }

    pub fn runtime(&self) -> Result<Runtime> {
        Runtime::open(self.config.clone(), &self.db_path(), self.token.clone())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
