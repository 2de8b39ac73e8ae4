//! Fan-out and barrier for one phase

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::error::OpError;
use super::outcome::{NodeResult, PhaseOutcome};
use crate::node::Node;

/// Runs one operation on every node of a group and waits for all of them.
///
/// The runner is policy-free: it never stops early on a failure and never
/// decides whether the caller continues. `run_phase` returns only after
/// every dispatched task has finished.
#[derive(Debug, Clone, Default)]
pub struct PhaseRunner {
    /// Worker cap per phase, 0 for one worker per node
    max_parallel: usize,
}

impl PhaseRunner {
    pub fn new(max_parallel: usize) -> Self {
        Self { max_parallel }
    }

    /// Number of workers used for a group of `node_count` nodes
    pub fn worker_count(&self, node_count: usize) -> usize {
        match self.max_parallel {
            0 => node_count,
            cap => cap.min(node_count),
        }
    }

    /// Run `op` on each node concurrently and collect every outcome.
    ///
    /// Results come back in the order of `nodes`, regardless of completion
    /// order. A panicking operation is reported as `OpError::Panicked` for
    /// its node; the other nodes are unaffected.
    pub fn run_phase<F>(&self, phase: &str, nodes: &[Node], op: F) -> PhaseOutcome
    where
        F: Fn(&Node) -> Result<(), OpError> + Sync,
    {
        let start = Instant::now();
        let workers = self.worker_count(nodes.len());
        info!(phase, nodes = nodes.len(), workers, "phase started");

        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, Result<(), OpError>, Duration)>();
        let mut slots: Vec<Option<(Result<(), OpError>, Duration)>> =
            (0..nodes.len()).map(|_| None).collect();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                let op = &op;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(node) = nodes.get(index) else {
                        break;
                    };

                    let task_start = Instant::now();
                    let result = panic::catch_unwind(AssertUnwindSafe(|| op(node)))
                        .unwrap_or_else(|_| {
                            Err(OpError::Panicked {
                                node: node.alias().to_string(),
                                phase: phase.to_string(),
                            })
                        });

                    if tx.send((index, result, task_start.elapsed())).is_err() {
                        break;
                    }
                });
            }

            // Workers hold the only remaining senders; the receive loop ends
            // once every worker has exited.
            drop(tx);
            for (index, result, duration) in rx {
                let node = &nodes[index];
                match &result {
                    Ok(()) => debug!(phase, node = node.alias(), ?duration, "node finished"),
                    Err(e) => warn!(phase, node = node.alias(), error = %e, "node failed"),
                }
                slots[index] = Some((result, duration));
            }
        });

        let results: Vec<NodeResult> = nodes
            .iter()
            .zip(slots)
            .map(|(node, slot)| {
                let (result, duration) = slot.unwrap_or_else(|| {
                    (
                        Err(OpError::Panicked {
                            node: node.alias().to_string(),
                            phase: phase.to_string(),
                        }),
                        Duration::ZERO,
                    )
                });
                NodeResult {
                    node: node.alias().to_string(),
                    result,
                    duration,
                }
            })
            .collect();

        let outcome = PhaseOutcome::new(phase, results, start.elapsed());
        let failed = outcome.failures().count();
        if failed == 0 {
            info!(phase, duration = ?outcome.duration(), "phase completed");
        } else {
            warn!(phase, failed, total = outcome.len(), "phase completed with failures");
        }
        outcome
    }
}
