//! Executor that records scripts instead of running them

use anyhow::Result;
use std::sync::Mutex;
use tracing::info;

use super::{ExecOutput, RemoteExecutor};

/// Logs and records every script, always reporting success.
#[derive(Debug)]
pub struct DryRunExecutor {
    alias: String,
    recorded: Mutex<Vec<String>>,
}

impl DryRunExecutor {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Scripts received so far, in call order
    pub fn scripts(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RemoteExecutor for DryRunExecutor {
    fn execute(&self, script: &str) -> Result<ExecOutput> {
        info!(node = %self.alias, bytes = script.len(), "dry run: script not executed");
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(script.to_string());
        Ok(ExecOutput::ok(""))
    }
}
