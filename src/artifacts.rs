//! Generated cluster configuration files.
//!
//! The coordinator gets one file describing the whole cluster: default
//! data-node settings, its own section, then one section per storage node
//! and one per query node, in pool order. Storage and query nodes get a
//! small file naming the storage engine and the coordinator address.

use serde::Deserialize;
use std::fmt::Write;

use crate::topology::ReplicaFactor;

/// File locations and memory budgets written into generated configs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtifactLayout {
    pub data_memory: String,
    pub index_memory: String,
    pub coordinator_datadir: String,
    pub storage_datadir: String,
    /// Install prefix of the query node binaries
    pub query_basedir: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            data_memory: "80M".to_string(),
            index_memory: "18M".to_string(),
            coordinator_datadir: "/var/lib/mysql-cluster".to_string(),
            storage_datadir: "/usr/local/mysql/data".to_string(),
            query_basedir: "/usr/local/mysql-cluster".to_string(),
        }
    }
}

/// Addresses of every cluster member, grouped by role
#[derive(Debug, Clone, Copy)]
pub struct ClusterAddresses<'a> {
    pub coordinator: &'a str,
    pub storage: &'a [&'a str],
    pub query: &'a [&'a str],
}

/// Render the coordinator's cluster-wide config file
pub fn render_coordinator_config(
    layout: &ArtifactLayout,
    replica_factor: ReplicaFactor,
    addresses: &ClusterAddresses<'_>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[ndbd default]");
    let _ = writeln!(out, "NoOfReplicas={replica_factor}");
    let _ = writeln!(out, "DataMemory={}", layout.data_memory);
    let _ = writeln!(out, "IndexMemory={}", layout.index_memory);

    let _ = writeln!(out);
    let _ = writeln!(out, "[ndb_mgmd]");
    let _ = writeln!(out, "hostname={}", addresses.coordinator);
    let _ = writeln!(out, "datadir={}", layout.coordinator_datadir);

    for address in addresses.storage {
        let _ = writeln!(out);
        let _ = writeln!(out, "[ndbd]");
        let _ = writeln!(out, "hostname={address}");
        let _ = writeln!(out, "datadir={}", layout.storage_datadir);
    }

    for address in addresses.query {
        let _ = writeln!(out);
        let _ = writeln!(out, "[mysqld]");
        let _ = writeln!(out, "hostname={address}");
    }

    out
}

/// Render the service config for a storage node
pub fn render_node_config(coordinator: &str) -> String {
    format!("[mysqld]\nndbcluster\n\n[mysql_cluster]\nndb-connectstring={coordinator}\n")
}

/// Render the service config for a query node
pub fn render_query_node_config(layout: &ArtifactLayout, coordinator: &str) -> String {
    format!(
        "{}\n[mysqld]\nbasedir={}/\n",
        render_node_config(coordinator),
        layout.query_basedir
    )
}
