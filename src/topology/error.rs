//! Topology planning errors and advisory corrections

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fatal pre-flight rejection of a requested topology
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Node pool does not hold exactly one coordinator plus the requested storage and query nodes
    #[error(
        "node pool has {pool_size} node(s) but the requested cluster needs {expected} \
         (1 coordinator + {storage_nodes} storage + {query_nodes} query)"
    )]
    SizeMismatch {
        pool_size: usize,
        expected: usize,
        storage_nodes: usize,
        query_nodes: usize,
    },
}

/// Non-fatal adjustment the planner made to the requested replica factor.
///
/// Corrections never stop a run; they are reported alongside the planned
/// topology so the caller can surface them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    /// Replica factor outside {1, 2}; replaced with 2
    ReplicaFactorOutOfRange { requested: i64 },
    /// Replica factor 2 with an odd storage node count; lowered to 1
    OddStorageForReplication { storage_nodes: usize },
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::ReplicaFactorOutOfRange { requested } => write!(
                f,
                "replica factor {requested} is not 1 or 2; using 2"
            ),
            Correction::OddStorageForReplication { storage_nodes } => write!(
                f,
                "replica factor 2 needs an even number of storage nodes, got {storage_nodes}; using 1"
            ),
        }
    }
}
