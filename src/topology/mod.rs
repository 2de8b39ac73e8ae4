//! Topology planning for a coordinator/storage/query cluster.
//!
//! The planner runs once, before any remote work. It rejects a node pool
//! whose size does not match the requested role counts, corrects an
//! unusable replica factor (reporting each correction), and splits the
//! ordered pool into role groups.

mod error;
mod planner;
mod roles;


pub use error::{Correction, TopologyError};
pub use planner::{PlannedTopology, ReplicaFactor, Topology, TopologyPlanner, TopologyRequest};
pub use roles::{Role, RoleGroups};
