//! Run configuration file schema

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::artifacts::ArtifactLayout;

/// Default package: the MySQL Cluster 7.3.7 generic Linux tarball
pub const DEFAULT_PACKAGE_URL: &str = "http://dev.mysql.com/get/Downloads/MySQL-Cluster-7.3/mysql-cluster-gpl-7.3.7-linux-glibc2.5-x86_64.tar.gz";
pub const DEFAULT_PACKAGE_NAME: &str = "mysql-cluster-gpl-7.3.7-linux-glibc2.5-x86_64";

/// Root of `cluster.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    pub cluster: ClusterSection,
    pub credentials: CredentialsSection,
    #[serde(default)]
    pub transport: TransportSection,
    #[serde(default)]
    pub package: PackageSection,
    #[serde(default)]
    pub artifacts: ArtifactLayout,
    /// Per-step script overrides keyed by step name
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    pub nodes: Vec<NodeEntry>,
}

/// Requested role counts
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSection {
    /// Any integer; the planner corrects values other than 1 or 2
    #[serde(default = "default_replica_factor")]
    pub replica_factor: i64,
    pub storage_nodes: usize,
    pub query_nodes: usize,
}

fn default_replica_factor() -> i64 {
    2
}

/// Administrative database account
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsSection {
    pub db_user: String,
    #[serde(default)]
    pub db_password: Option<String>,
    /// Environment variable holding the password, used when `db_password` is unset
    #[serde(default)]
    pub db_password_env: Option<String>,
}

impl std::fmt::Debug for CredentialsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsSection")
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.as_ref().map(|_| "<redacted>"))
            .field("db_password_env", &self.db_password_env)
            .finish()
    }
}

/// How scripts reach the nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    #[default]
    Ssh,
    Local,
    DryRun,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSection {
    pub kind: TransportKind,
    pub user: String,
    pub port: u16,
    pub identity_file: Option<PathBuf>,
    pub use_sudo: bool,
    /// Per-step timeout; a step still running after this is killed and fails
    pub command_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Worker cap per phase, 0 for one worker per node
    pub max_parallel: usize,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            kind: TransportKind::Ssh,
            user: "root".to_string(),
            port: 22,
            identity_file: None,
            use_sudo: false,
            command_timeout_secs: 900,
            connect_timeout_secs: 10,
            max_parallel: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageSection {
    pub url: String,
    /// Directory name the archive unpacks to
    pub name: String,
}

impl Default for PackageSection {
    fn default() -> Self {
        Self {
            url: DEFAULT_PACKAGE_URL.to_string(),
            name: DEFAULT_PACKAGE_NAME.to_string(),
        }
    }
}

/// One machine of the pool; order in the file is pool order
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub alias: String,
    /// Host to connect to, defaults to the alias
    #[serde(default)]
    pub host: Option<String>,
    /// Address other members use to reach this node, defaults to the alias
    #[serde(default)]
    pub address: Option<String>,
}

impl NodeEntry {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(&self.alias)
    }

    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.alias)
    }
}
