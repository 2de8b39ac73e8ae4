//! Node handles and the remote execution capability behind them.
//!
//! A [`Node`] is an immutable handle to one provisioned machine: a stable
//! alias used for attribution, the address other cluster members use to
//! reach it, and a [`RemoteExecutor`] that runs shell scripts on it.
//!
//! Executors:
//!
//! - [`SshExecutor`] runs scripts over the system `ssh` client
//! - [`LocalExecutor`] runs scripts with `sh -c` on this host
//! - [`DryRunExecutor`] records scripts without running anything

mod dry_run;
mod local;
mod shell;
mod ssh;


use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use dry_run::DryRunExecutor;
pub use local::LocalExecutor;
pub use ssh::{SshExecutor, SshSettings};

/// Default timeout for one remote step (15 minutes)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(900);

/// Captured result of running one script on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecOutput {
    /// Exit status, `None` when the process was killed
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    /// Whether the command was terminated due to timeout
    pub timed_out: bool,
}

impl ExecOutput {
    /// Successful output with the given stdout, for executors that do not spawn processes
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
            duration: Duration::ZERO,
            timed_out: false,
        }
    }

    /// Failed output with the given exit status and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
            timed_out: false,
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// One-line status summary
    pub fn summary(&self) -> String {
        let status = if self.timed_out {
            "TIMEOUT"
        } else if self.success() {
            "OK"
        } else {
            "FAILED"
        };
        format!(
            "{} ({}ms, exit code: {:?})",
            status,
            self.duration.as_millis(),
            self.exit_code
        )
    }
}

/// Capability to run a shell script on one machine.
///
/// Implementations block until the script finishes. An `Err` means the
/// script could not be run at all (spawn failure, missing binary); a script
/// that ran and exited non-zero is an `Ok` with a failing [`ExecOutput`].
pub trait RemoteExecutor: Send + Sync {
    fn execute(&self, script: &str) -> Result<ExecOutput>;
}

/// Handle to one provisioned machine
#[derive(Clone)]
pub struct Node {
    alias: String,
    address: String,
    executor: Arc<dyn RemoteExecutor>,
}

impl Node {
    pub fn new(
        alias: impl Into<String>,
        address: impl Into<String>,
        executor: Arc<dyn RemoteExecutor>,
    ) -> Self {
        Self {
            alias: alias.into(),
            address: address.into(),
            executor,
        }
    }

    /// Stable identifier used in logs and failure reports
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Address other cluster members use to reach this node
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn execute(&self, script: &str) -> Result<ExecOutput> {
        self.executor.execute(script)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("alias", &self.alias)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alias)
    }
}
