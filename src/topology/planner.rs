//! Topology validation and correction

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use super::error::{Correction, TopologyError};

/// Number of copies kept of each data partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ReplicaFactor {
    One,
    Two,
}

impl ReplicaFactor {
    pub fn as_u8(self) -> u8 {
        match self {
            ReplicaFactor::One => 1,
            ReplicaFactor::Two => 2,
        }
    }
}

impl From<ReplicaFactor> for u8 {
    fn from(value: ReplicaFactor) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for ReplicaFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Role counts as supplied by the user, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyRequest {
    pub replica_factor: i64,
    pub storage_nodes: usize,
    pub query_nodes: usize,
}

/// Validated cluster shape: one coordinator plus storage and query groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub replica_factor: ReplicaFactor,
    pub storage_nodes: usize,
    pub query_nodes: usize,
}

impl Topology {
    /// Pool size this topology needs, `None` if the count overflows
    pub fn total_nodes(&self) -> Option<usize> {
        required_nodes(self.storage_nodes, self.query_nodes)
    }
}

/// `1 + storage + query`, checked
fn required_nodes(storage_nodes: usize, query_nodes: usize) -> Option<usize> {
    storage_nodes.checked_add(query_nodes)?.checked_add(1)
}

/// Planner output: the topology plus any corrections applied to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTopology {
    pub topology: Topology,
    pub corrections: Vec<Correction>,
}

/// Validates role counts against a node pool and partitions the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyPlanner;

impl TopologyPlanner {
    /// Validate `request` against a pool of `pool_size` nodes.
    ///
    /// A pool size that does not equal `1 + storage + query` is fatal. An
    /// unusable replica factor is corrected and reported, never rejected.
    pub fn plan(
        &self,
        pool_size: usize,
        request: &TopologyRequest,
    ) -> Result<PlannedTopology, TopologyError> {
        let expected = required_nodes(request.storage_nodes, request.query_nodes);
        if expected != Some(pool_size) {
            let expected = expected.unwrap_or(usize::MAX);
            warn!(
                pool_size,
                expected, "node pool size does not match requested cluster"
            );
            return Err(TopologyError::SizeMismatch {
                pool_size,
                expected,
                storage_nodes: request.storage_nodes,
                query_nodes: request.query_nodes,
            });
        }
        info!(pool_size, "node pool size matches requested cluster");

        let mut corrections = Vec::new();

        let mut replica_factor = match request.replica_factor {
            1 => ReplicaFactor::One,
            2 => ReplicaFactor::Two,
            requested => {
                corrections.push(Correction::ReplicaFactorOutOfRange { requested });
                ReplicaFactor::Two
            }
        };

        if replica_factor == ReplicaFactor::Two && request.storage_nodes % 2 != 0 {
            corrections.push(Correction::OddStorageForReplication {
                storage_nodes: request.storage_nodes,
            });
            replica_factor = ReplicaFactor::One;
        }

        for correction in &corrections {
            warn!(%correction, "topology corrected");
        }

        let topology = Topology {
            replica_factor,
            storage_nodes: request.storage_nodes,
            query_nodes: request.query_nodes,
        };
        info!(
            replica_factor = %topology.replica_factor,
            storage_nodes = topology.storage_nodes,
            query_nodes = topology.query_nodes,
            "topology planned"
        );

        Ok(PlannedTopology {
            topology,
            corrections,
        })
    }
}
