//! Loading, validating and resolving the run configuration

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::types::{ClusterConfig, TransportKind};
use crate::node::{DryRunExecutor, LocalExecutor, Node, RemoteExecutor, SshExecutor, SshSettings};
use crate::orchestrator::{Credentials, PackageSource, ProvisionSettings};
use crate::phase::PhaseRunner;
use crate::scripts::ScriptCatalog;
use crate::topology::TopologyRequest;
use crate::validation::{validate_alias, validate_credential, validate_host};

/// File name looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "cluster.toml";

/// Pick the config file: explicit path, then `./cluster.toml`, then
/// `<config dir>/clusterforge/cluster.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join("clusterforge").join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

impl ClusterConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse and validate config text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClusterConfig = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that does not depend on the node pool size.
    ///
    /// Pool size against role counts is the planner's job and is reported
    /// as a topology rejection, not a config error.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            bail!("No nodes defined");
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            validate_alias(&node.alias)?;
            validate_host(node.host())
                .with_context(|| format!("Node '{}' has an invalid host", node.alias))?;
            validate_host(node.address())
                .with_context(|| format!("Node '{}' has an invalid address", node.alias))?;
            if !seen.insert(node.alias.as_str()) {
                bail!("Duplicate node alias '{}'", node.alias);
            }
        }

        if self.credentials.db_user.trim().is_empty() {
            bail!("credentials.db_user cannot be empty");
        }
        validate_credential("credentials.db_user", &self.credentials.db_user)?;
        if let Some(password) = &self.credentials.db_password {
            validate_credential("credentials.db_password", password)?;
        }
        if self.credentials.db_password.is_none() && self.credentials.db_password_env.is_none() {
            bail!("Set credentials.db_password or credentials.db_password_env");
        }

        if self.transport.command_timeout_secs == 0 {
            bail!("transport.command_timeout_secs must be greater than 0");
        }
        if self.transport.connect_timeout_secs == 0 {
            bail!("transport.connect_timeout_secs must be greater than 0");
        }
        if self.transport.user.trim().is_empty() {
            bail!("transport.user cannot be empty");
        }

        if self.package.url.trim().is_empty() || self.package.name.trim().is_empty() {
            bail!("package.url and package.name cannot be empty");
        }

        Ok(())
    }

    pub fn topology_request(&self) -> TopologyRequest {
        TopologyRequest {
            replica_factor: self.cluster.replica_factor,
            storage_nodes: self.cluster.storage_nodes,
            query_nodes: self.cluster.query_nodes,
        }
    }

    /// Password from the file, or from the configured environment variable
    pub fn resolve_password(&self) -> Result<String> {
        if let Some(password) = &self.credentials.db_password {
            return Ok(password.clone());
        }
        match &self.credentials.db_password_env {
            Some(var) => {
                let password = std::env::var(var)
                    .with_context(|| format!("Environment variable {var} is not set"))?;
                validate_credential(var, &password)?;
                Ok(password)
            }
            None => bail!("No database password configured"),
        }
    }

    pub fn provision_settings(&self) -> Result<ProvisionSettings> {
        Ok(ProvisionSettings {
            package: PackageSource {
                url: self.package.url.clone(),
                name: self.package.name.clone(),
            },
            layout: self.artifacts.clone(),
            credentials: Credentials {
                user: self.credentials.db_user.clone(),
                password: self.resolve_password()?,
            },
        })
    }

    pub fn script_catalog(&self) -> Result<ScriptCatalog> {
        ScriptCatalog::with_overrides(&self.scripts)
    }

    pub fn phase_runner(&self) -> PhaseRunner {
        PhaseRunner::new(self.transport.max_parallel)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.transport.command_timeout_secs)
    }

    fn ssh_settings(&self) -> SshSettings {
        SshSettings {
            user: self.transport.user.clone(),
            port: self.transport.port,
            identity_file: self.transport.identity_file.as_deref().map(expand_home),
            use_sudo: self.transport.use_sudo,
            connect_timeout: Duration::from_secs(self.transport.connect_timeout_secs),
            command_timeout: self.command_timeout(),
        }
    }

    /// Effective transport, with `dry_run` taking precedence over the file
    pub fn transport_kind(&self, dry_run: bool) -> TransportKind {
        if dry_run {
            TransportKind::DryRun
        } else {
            self.transport.kind
        }
    }

    /// Build node handles in file order
    pub fn build_pool(&self, kind: TransportKind) -> Result<Vec<Node>> {
        self.nodes
            .iter()
            .map(|entry| {
                let executor: Arc<dyn RemoteExecutor> = match kind {
                    TransportKind::Ssh => Arc::new(
                        SshExecutor::new(entry.host(), self.ssh_settings())
                            .with_context(|| format!("Cannot reach node '{}'", entry.alias))?,
                    ),
                    TransportKind::Local => {
                        Arc::new(LocalExecutor::with_timeout(self.command_timeout()))
                    }
                    TransportKind::DryRun => Arc::new(DryRunExecutor::new(entry.alias.clone())),
                };
                Ok(Node::new(entry.alias.clone(), entry.address(), executor))
            })
            .collect()
    }
}
