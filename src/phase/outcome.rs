//! Aggregated results of one phase

use std::time::Duration;

use super::error::{OpError, PhaseFailure};

/// Outcome of one node's operation
#[derive(Debug, Clone)]
pub struct NodeResult {
    pub node: String,
    pub result: Result<(), OpError>,
    pub duration: Duration,
}

/// Every node's outcome for one phase, in the order the nodes were given
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    phase: String,
    results: Vec<NodeResult>,
    duration: Duration,
}

impl PhaseOutcome {
    pub(crate) fn new(phase: &str, results: Vec<NodeResult>, duration: Duration) -> Self {
        Self {
            phase: phase.to_string(),
            results,
            duration,
        }
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    pub fn results(&self) -> &[NodeResult] {
        &self.results
    }

    /// Wall-clock time from dispatch until the last node finished
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result for the node with `alias`
    pub fn get(&self, alias: &str) -> Option<&Result<(), OpError>> {
        self.results
            .iter()
            .find(|r| r.node == alias)
            .map(|r| &r.result)
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &OpError> {
        self.results.iter().filter_map(|r| r.result.as_ref().err())
    }

    pub fn succeeded_nodes(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.result.is_ok())
            .map(|r| r.node.as_str())
            .collect()
    }

    /// Collapse into a `PhaseFailure` if any node failed
    pub fn into_result(self) -> Result<Self, PhaseFailure> {
        if self.is_success() {
            return Ok(self);
        }
        let failures = self.failures().cloned().collect();
        Err(PhaseFailure {
            phase: self.phase,
            failures,
        })
    }
}
