//! Named remote steps

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One named shell payload run on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Purge,
    InstallPrerequisites,
    CreateServiceAccount,
    FetchPackage,
    StageCoordinatorFiles,
    StageStorageFiles,
    StageQueryFiles,
    ConfigureCoordinator,
    ConfigureStorageNode,
    ConfigureQueryNode,
    UpdateSecurityPolicy,
    InitializeDatabase,
    StartCoordinator,
    StartStorageNode,
    StartQueryNode,
    ProvisionCredentials,
}

impl StepId {
    pub fn all() -> &'static [StepId] {
        &[
            StepId::Purge,
            StepId::InstallPrerequisites,
            StepId::CreateServiceAccount,
            StepId::FetchPackage,
            StepId::StageCoordinatorFiles,
            StepId::StageStorageFiles,
            StepId::StageQueryFiles,
            StepId::ConfigureCoordinator,
            StepId::ConfigureStorageNode,
            StepId::ConfigureQueryNode,
            StepId::UpdateSecurityPolicy,
            StepId::InitializeDatabase,
            StepId::StartCoordinator,
            StepId::StartStorageNode,
            StepId::StartQueryNode,
            StepId::ProvisionCredentials,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepId::Purge => "purge",
            StepId::InstallPrerequisites => "install_prerequisites",
            StepId::CreateServiceAccount => "create_service_account",
            StepId::FetchPackage => "fetch_package",
            StepId::StageCoordinatorFiles => "stage_coordinator_files",
            StepId::StageStorageFiles => "stage_storage_files",
            StepId::StageQueryFiles => "stage_query_files",
            StepId::ConfigureCoordinator => "configure_coordinator",
            StepId::ConfigureStorageNode => "configure_storage_node",
            StepId::ConfigureQueryNode => "configure_query_node",
            StepId::UpdateSecurityPolicy => "update_security_policy",
            StepId::InitializeDatabase => "initialize_database",
            StepId::StartCoordinator => "start_coordinator",
            StepId::StartStorageNode => "start_storage_node",
            StepId::StartQueryNode => "start_query_node",
            StepId::ProvisionCredentials => "provision_credentials",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StepId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::all()
            .iter()
            .copied()
            .find(|step| step.name() == s)
            .ok_or_else(|| format!("unknown step '{s}'"))
    }
}
