//! Per-node and per-phase failure types

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::node::ExecOutput;

/// Lines of each output stream kept when a failure is displayed
const DISPLAY_TAIL_LINES: usize = 20;

/// Failure of one node's operation within a phase
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpError {
    /// The step ran and exited non-zero, or was killed after its timeout
    #[error("{node}: step '{step}' failed in phase '{phase}' ({})", describe_exit(.exit_status, .timed_out))]
    RemoteFailure {
        node: String,
        phase: String,
        step: String,
        exit_status: Option<i32>,
        timed_out: bool,
        stdout: String,
        stderr: String,
    },
    /// The step could not be started on the node
    #[error("{node}: could not run step '{step}' in phase '{phase}': {message}")]
    Transport {
        node: String,
        phase: String,
        step: String,
        message: String,
    },
    /// The node's task panicked
    #[error("{node}: task panicked in phase '{phase}'")]
    Panicked { node: String, phase: String },
}

fn describe_exit(exit_status: &Option<i32>, timed_out: &bool) -> String {
    match (*timed_out, *exit_status) {
        (true, _) => "timed out".to_string(),
        (false, Some(code)) => format!("exit status {code}"),
        (false, None) => "killed by signal".to_string(),
    }
}

impl OpError {
    /// Build a `RemoteFailure` from a failing step output
    pub fn remote_failure(node: &str, phase: &str, step: &str, output: ExecOutput) -> Self {
        OpError::RemoteFailure {
            node: node.to_string(),
            phase: phase.to_string(),
            step: step.to_string(),
            exit_status: output.exit_code,
            timed_out: output.timed_out,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }

    pub fn node(&self) -> &str {
        match self {
            OpError::RemoteFailure { node, .. }
            | OpError::Transport { node, .. }
            | OpError::Panicked { node, .. } => node,
        }
    }

    pub fn phase(&self) -> &str {
        match self {
            OpError::RemoteFailure { phase, .. }
            | OpError::Transport { phase, .. }
            | OpError::Panicked { phase, .. } => phase,
        }
    }

    /// Captured remote output, trimmed to the last lines of each stream
    pub fn output_tail(&self) -> Option<String> {
        match self {
            OpError::RemoteFailure { stdout, stderr, .. } => {
                let mut tail = String::new();
                for (label, stream) in [("stdout", stdout), ("stderr", stderr)] {
                    let stream = stream.trim_end();
                    if stream.is_empty() {
                        continue;
                    }
                    tail.push_str(&format!("--- {label} ---\n"));
                    tail.push_str(&last_lines(stream, DISPLAY_TAIL_LINES));
                    tail.push('\n');
                }
                Some(tail)
            }
            _ => None,
        }
    }
}

fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(count);
    lines[skip..].join("\n")
}

/// One or more node failures within a single phase
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct PhaseFailure {
    pub phase: String,
    pub failures: Vec<OpError>,
}

impl PhaseFailure {
    /// Aliases of the nodes that failed, in pool order
    pub fn failed_nodes(&self) -> Vec<&str> {
        self.failures.iter().map(OpError::node).collect()
    }
}

impl fmt::Display for PhaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "phase '{}' failed on {} node(s): {}",
            self.phase,
            self.failures.len(),
            self.failed_nodes().join(", ")
        )
    }
}
