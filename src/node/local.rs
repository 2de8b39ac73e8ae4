//! Executor that runs scripts on the local host

use anyhow::Result;
use std::process::Command;
use std::time::Duration;

use super::shell::run_with_timeout;
use super::{ExecOutput, RemoteExecutor, DEFAULT_COMMAND_TIMEOUT};

/// Runs each script through `sh -c` on this machine.
///
/// Useful for single-host rigs where every "node" is a container or
/// chroot reachable from a local shell.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    timeout: Duration,
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl LocalExecutor {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl RemoteExecutor for LocalExecutor {
    fn execute(&self, script: &str) -> Result<ExecOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        run_with_timeout(cmd, "local shell", self.timeout)
    }
}
