//! `clusterforge render`

use anyhow::Result;
use clap::ValueEnum;
use std::path::Path;

use super::load_config;
use crate::artifacts::{
    render_coordinator_config, render_node_config, render_query_node_config, ClusterAddresses,
};
use crate::config::NodeEntry;
use crate::topology::TopologyPlanner;

/// Which generated config file to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArtifactKind {
    /// Cluster-wide file for the coordinator
    Coordinator,
    /// Service config for storage nodes
    Storage,
    /// Service config for query nodes
    Query,
}

/// Print a generated config file for the configured cluster to stdout
pub fn execute(config_path: Option<&Path>, kind: ArtifactKind) -> Result<()> {
    let config = load_config(config_path)?;
    let planner = TopologyPlanner;

    let planned = planner.plan(config.nodes.len(), &config.topology_request())?;
    let groups = planner.assign_roles(&config.nodes, &planned.topology)?;
    let coordinator = groups.coordinator().address();

    let rendered = match kind {
        ArtifactKind::Coordinator => {
            let storage: Vec<&str> = groups.storage().iter().map(NodeEntry::address).collect();
            let query: Vec<&str> = groups.query().iter().map(NodeEntry::address).collect();
            render_coordinator_config(
                &config.artifacts,
                planned.topology.replica_factor,
                &ClusterAddresses {
                    coordinator,
                    storage: &storage,
                    query: &query,
                },
            )
        }
        ArtifactKind::Storage => render_node_config(coordinator),
        ArtifactKind::Query => render_query_node_config(&config.artifacts, coordinator),
    };

    print!("{rendered}");
    Ok(())
}
