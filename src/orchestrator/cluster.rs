//! Top-level provisioning state machine

use chrono::Utc;
use tracing::{debug, info, warn};

use super::phases::PhaseId;
use super::report::{GroupSummary, PhaseRecord, ProvisionError, ProvisionReport};
use crate::artifacts::{
    render_coordinator_config, render_node_config, render_query_node_config, ArtifactLayout,
    ClusterAddresses,
};
use crate::node::Node;
use crate::phase::{OpError, PhaseRunner};
use crate::scripts::{sql_escape, ScriptCatalog, ScriptContext};
use crate::topology::{RoleGroups, Topology, TopologyPlanner, TopologyRequest};

/// Where the distributable package comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    pub url: String,
    /// Directory name the archive unpacks to
    pub name: String,
}

/// Administrative database account issued on query nodes
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Run-wide inputs rendered into step scripts
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub package: PackageSource,
    pub layout: ArtifactLayout,
    pub credentials: Credentials,
}

/// Drives the phase sequence over a node pool.
///
/// Phases run strictly in [`PhaseId::sequence`] order. Each phase is one
/// [`PhaseRunner::run_phase`] call over its target group; the run stops at
/// the first phase in which any node failed.
#[derive(Debug, Clone)]
pub struct ClusterOrchestrator {
    planner: TopologyPlanner,
    runner: PhaseRunner,
    scripts: ScriptCatalog,
    settings: ProvisionSettings,
}

impl ClusterOrchestrator {
    pub fn new(runner: PhaseRunner, scripts: ScriptCatalog, settings: ProvisionSettings) -> Self {
        Self {
            planner: TopologyPlanner,
            runner,
            scripts,
            settings,
        }
    }

    /// Provision a cluster on `pool`.
    ///
    /// `pool[0]` becomes the coordinator. The topology is validated before
    /// any remote call; a size mismatch returns `ProvisionError::Topology`
    /// with nothing executed.
    pub fn provision(
        &self,
        pool: &[Node],
        request: &TopologyRequest,
    ) -> Result<ProvisionReport, ProvisionError> {
        let started_at = Utc::now();

        let planned = self.planner.plan(pool.len(), request)?;
        let topology = planned.topology;
        let groups = self.planner.assign_roles(pool, &topology)?;

        info!(
            coordinator = groups.coordinator().alias(),
            storage = groups.storage().len(),
            query = groups.query().len(),
            "roles assigned"
        );

        let base_context = self.base_context(&topology, &groups);
        let mut completed = Vec::new();

        for &phase in PhaseId::sequence() {
            let nodes = phase.target().select(&groups);
            if nodes.is_empty() {
                debug!(phase = phase.name(), "no nodes in target group");
            }

            let outcome = self.runner.run_phase(phase.name(), nodes, |node| {
                self.run_steps(phase, node, &base_context)
            });

            let duration_ms = outcome.duration().as_millis();
            match outcome.into_result() {
                Ok(outcome) => completed.push(PhaseRecord {
                    phase,
                    nodes: outcome.succeeded_nodes().iter().map(|s| s.to_string()).collect(),
                    duration_ms,
                }),
                Err(failure) => {
                    warn!(
                        phase = phase.name(),
                        failed = ?failure.failed_nodes(),
                        "stopping run after failed phase"
                    );
                    return Err(ProvisionError::Phase {
                        failure,
                        corrections: planned.corrections,
                        completed,
                    });
                }
            }
        }

        info!(phases = completed.len(), "cluster provisioned");

        Ok(ProvisionReport {
            started_at,
            finished_at: Utc::now(),
            topology,
            corrections: planned.corrections,
            groups: GroupSummary {
                coordinator: groups.coordinator().alias().to_string(),
                storage: groups.storage().iter().map(|n| n.alias().to_string()).collect(),
                query: groups.query().iter().map(|n| n.alias().to_string()).collect(),
            },
            phases: completed,
        })
    }

    /// Variables shared by every step of the run
    fn base_context(&self, topology: &Topology, groups: &RoleGroups<'_, Node>) -> ScriptContext {
        let settings = &self.settings;
        let coordinator = groups.coordinator().address();
        let storage: Vec<&str> = groups.storage().iter().map(Node::address).collect();
        let query: Vec<&str> = groups.query().iter().map(Node::address).collect();

        let coordinator_config = render_coordinator_config(
            &settings.layout,
            topology.replica_factor,
            &ClusterAddresses {
                coordinator,
                storage: &storage,
                query: &query,
            },
        );

        ScriptContext::new()
            .with("COORDINATOR_ADDRESS", coordinator)
            .with("REPLICA_FACTOR", &topology.replica_factor.to_string())
            .with("PACKAGE_URL", &settings.package.url)
            .with("PACKAGE_NAME", &settings.package.name)
            .with("COORDINATOR_CONFIG", coordinator_config.trim_end())
            .with("NODE_CONFIG", render_node_config(coordinator).trim_end())
            .with(
                "QUERY_NODE_CONFIG",
                render_query_node_config(&settings.layout, coordinator).trim_end(),
            )
            .with("COORDINATOR_DATADIR", &settings.layout.coordinator_datadir)
            .with("STORAGE_DATADIR", &settings.layout.storage_datadir)
            .with("QUERY_BASEDIR", &settings.layout.query_basedir)
            .with("DB_USER", &sql_escape(&settings.credentials.user))
            .with("DB_PASSWORD", &sql_escape(&settings.credentials.password))
    }

    /// Per-node operation for `phase`: its steps in order, stopping at the first failure
    fn run_steps(&self, phase: PhaseId, node: &Node, base: &ScriptContext) -> Result<(), OpError> {
        let context = base
            .clone()
            .with("NODE_ALIAS", node.alias())
            .with("NODE_ADDRESS", node.address());

        for &step in phase.steps() {
            let script = self.scripts.render(step, &context);
            debug!(
                phase = phase.name(),
                node = node.alias(),
                step = step.name(),
                bytes = script.len(),
                "running step"
            );

            let output = node.execute(&script).map_err(|e| OpError::Transport {
                node: node.alias().to_string(),
                phase: phase.name().to_string(),
                step: step.name().to_string(),
                message: format!("{e:#}"),
            })?;

            if !output.success() {
                return Err(OpError::remote_failure(
                    node.alias(),
                    phase.name(),
                    step.name(),
                    output,
                ));
            }
            debug!(
                phase = phase.name(),
                node = node.alias(),
                step = step.name(),
                summary = %output.summary(),
                "step finished"
            );
        }

        Ok(())
    }
}
