//! Cluster provisioning: topology planning, then the phase sequence.

mod cluster;
mod phases;
mod report;


pub use cluster::{ClusterOrchestrator, Credentials, PackageSource, ProvisionSettings};
pub use phases::{plan_phases, PhaseId, PhasePlan, Target};
pub use report::{GroupSummary, PhaseRecord, ProvisionError, ProvisionReport, RunSummary};
