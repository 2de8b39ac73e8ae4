//! Partitioning of the node pool into role groups

use serde::Serialize;
use std::fmt;

use super::error::TopologyError;
use super::planner::{Topology, TopologyPlanner};

/// Role a node plays in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinator,
    Storage,
    Query,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coordinator => write!(f, "coordinator"),
            Role::Storage => write!(f, "storage"),
            Role::Query => write!(f, "query"),
        }
    }
}

/// Role groups as index ranges over one ordered pool.
///
/// `pool[0]` is the coordinator, the next `storage_nodes` entries are the
/// storage group and the remainder is the query group. Groups are borrowed
/// slices, so they are disjoint and cover the pool exactly once.
#[derive(Debug, Clone, Copy)]
pub struct RoleGroups<'a, T> {
    pool: &'a [T],
    storage_end: usize,
}

impl<'a, T> RoleGroups<'a, T> {
    pub fn coordinator(&self) -> &'a T {
        &self.pool[0]
    }

    /// The coordinator as a one-element group
    pub fn coordinator_group(&self) -> &'a [T] {
        &self.pool[..1]
    }

    pub fn storage(&self) -> &'a [T] {
        &self.pool[1..self.storage_end]
    }

    pub fn query(&self) -> &'a [T] {
        &self.pool[self.storage_end..]
    }

    /// Storage and query groups together, in pool order
    pub fn storage_and_query(&self) -> &'a [T] {
        &self.pool[1..]
    }

    pub fn all(&self) -> &'a [T] {
        self.pool
    }

    pub fn group(&self, role: Role) -> &'a [T] {
        match role {
            Role::Coordinator => self.coordinator_group(),
            Role::Storage => self.storage(),
            Role::Query => self.query(),
        }
    }
}

impl TopologyPlanner {
    /// Split `pool` into coordinator, storage and query groups.
    ///
    /// Deterministic for a given pool order. Fails with `SizeMismatch` when
    /// the pool is not exactly the size `topology` describes.
    pub fn assign_roles<'a, T>(
        &self,
        pool: &'a [T],
        topology: &Topology,
    ) -> Result<RoleGroups<'a, T>, TopologyError> {
        let expected = topology.total_nodes();
        if expected != Some(pool.len()) {
            return Err(TopologyError::SizeMismatch {
                pool_size: pool.len(),
                expected: expected.unwrap_or(usize::MAX),
                storage_nodes: topology.storage_nodes,
                query_nodes: topology.query_nodes,
            });
        }

        Ok(RoleGroups {
            pool,
            storage_end: 1 + topology.storage_nodes,
        })
    }
}
