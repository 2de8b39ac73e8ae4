//! The provisioning phase sequence

use serde::Serialize;
use std::fmt;

use crate::scripts::StepId;
use crate::topology::RoleGroups;

/// Node group a phase runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    All,
    StorageAndQuery,
    Coordinator,
    Storage,
    Query,
}

impl Target {
    /// Nodes of `groups` this target selects, in pool order
    pub fn select<'a, T>(&self, groups: &RoleGroups<'a, T>) -> &'a [T] {
        match self {
            Target::All => groups.all(),
            Target::StorageAndQuery => groups.storage_and_query(),
            Target::Coordinator => groups.coordinator_group(),
            Target::Storage => groups.storage(),
            Target::Query => groups.query(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => write!(f, "all nodes"),
            Target::StorageAndQuery => write!(f, "storage + query"),
            Target::Coordinator => write!(f, "coordinator"),
            Target::Storage => write!(f, "storage"),
            Target::Query => write!(f, "query"),
        }
    }
}

/// One barrier-synchronized step of the provisioning sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    Purge,
    InstallPrerequisites,
    FetchPackage,
    StageCoordinatorFiles,
    StageStorageFiles,
    StageQueryFiles,
    ConfigureCoordinator,
    ConfigureStorageNodes,
    ConfigureQueryNodes,
    StartCoordinator,
    StartStorageNodes,
    StartQueryNodes,
    ProvisionCredentials,
}

impl PhaseId {
    /// Every phase, in execution order.
    ///
    /// The start phases are ordered coordinator, storage, query: storage
    /// nodes register with a listening coordinator, and query nodes start
    /// serving only once storage is registered.
    pub fn sequence() -> &'static [PhaseId] {
        &[
            PhaseId::Purge,
            PhaseId::InstallPrerequisites,
            PhaseId::FetchPackage,
            PhaseId::StageCoordinatorFiles,
            PhaseId::StageStorageFiles,
            PhaseId::StageQueryFiles,
            PhaseId::ConfigureCoordinator,
            PhaseId::ConfigureStorageNodes,
            PhaseId::ConfigureQueryNodes,
            PhaseId::StartCoordinator,
            PhaseId::StartStorageNodes,
            PhaseId::StartQueryNodes,
            PhaseId::ProvisionCredentials,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PhaseId::Purge => "purge",
            PhaseId::InstallPrerequisites => "install_prerequisites",
            PhaseId::FetchPackage => "fetch_package",
            PhaseId::StageCoordinatorFiles => "stage_coordinator_files",
            PhaseId::StageStorageFiles => "stage_storage_files",
            PhaseId::StageQueryFiles => "stage_query_files",
            PhaseId::ConfigureCoordinator => "configure_coordinator",
            PhaseId::ConfigureStorageNodes => "configure_storage_nodes",
            PhaseId::ConfigureQueryNodes => "configure_query_nodes",
            PhaseId::StartCoordinator => "start_coordinator",
            PhaseId::StartStorageNodes => "start_storage_nodes",
            PhaseId::StartQueryNodes => "start_query_nodes",
            PhaseId::ProvisionCredentials => "provision_credentials",
        }
    }

    pub fn target(&self) -> Target {
        match self {
            PhaseId::Purge | PhaseId::FetchPackage => Target::All,
            PhaseId::InstallPrerequisites => Target::StorageAndQuery,
            PhaseId::StageCoordinatorFiles
            | PhaseId::ConfigureCoordinator
            | PhaseId::StartCoordinator => Target::Coordinator,
            PhaseId::StageStorageFiles
            | PhaseId::ConfigureStorageNodes
            | PhaseId::StartStorageNodes => Target::Storage,
            PhaseId::StageQueryFiles
            | PhaseId::ConfigureQueryNodes
            | PhaseId::StartQueryNodes
            | PhaseId::ProvisionCredentials => Target::Query,
        }
    }

    /// Steps run one after another on each target node
    pub fn steps(&self) -> &'static [StepId] {
        match self {
            PhaseId::Purge => &[StepId::Purge],
            PhaseId::InstallPrerequisites => {
                &[StepId::InstallPrerequisites, StepId::CreateServiceAccount]
            }
            PhaseId::FetchPackage => &[StepId::FetchPackage],
            PhaseId::StageCoordinatorFiles => &[StepId::StageCoordinatorFiles],
            PhaseId::StageStorageFiles => &[StepId::StageStorageFiles],
            PhaseId::StageQueryFiles => &[StepId::StageQueryFiles],
            PhaseId::ConfigureCoordinator => &[StepId::ConfigureCoordinator],
            PhaseId::ConfigureStorageNodes => &[StepId::ConfigureStorageNode],
            PhaseId::ConfigureQueryNodes => &[
                StepId::ConfigureQueryNode,
                StepId::UpdateSecurityPolicy,
                StepId::InitializeDatabase,
            ],
            PhaseId::StartCoordinator => &[StepId::StartCoordinator],
            PhaseId::StartStorageNodes => &[StepId::StartStorageNode],
            PhaseId::StartQueryNodes => &[StepId::StartQueryNode],
            PhaseId::ProvisionCredentials => &[StepId::ProvisionCredentials],
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A phase resolved against concrete role groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhasePlan {
    pub phase: PhaseId,
    pub target: Target,
    pub steps: Vec<StepId>,
    pub nodes: Vec<String>,
}

/// Resolve every phase against `groups`, without running anything
pub fn plan_phases<T>(
    groups: &RoleGroups<'_, T>,
    alias: impl Fn(&T) -> String,
) -> Vec<PhasePlan> {
    PhaseId::sequence()
        .iter()
        .map(|&phase| PhasePlan {
            phase,
            target: phase.target(),
            steps: phase.steps().to_vec(),
            nodes: phase.target().select(groups).iter().map(&alias).collect(),
        })
        .collect()
}
