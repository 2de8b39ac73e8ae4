//! Outcome of a provisioning run

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::phases::PhaseId;
use crate::phase::PhaseFailure;
use crate::topology::{Correction, Topology, TopologyError};

/// A phase that completed on every target node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    pub phase: PhaseId,
    pub nodes: Vec<String>,
    pub duration_ms: u128,
}

/// Node aliases per role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub coordinator: String,
    pub storage: Vec<String>,
    pub query: Vec<String>,
}

/// Successful provisioning run
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub topology: Topology,
    pub corrections: Vec<Correction>,
    pub groups: GroupSummary,
    pub phases: Vec<PhaseRecord>,
}

/// Why a run stopped
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Rejected before any remote call
    #[error("topology rejected: {0}")]
    Topology(#[from] TopologyError),

    /// A phase failed on one or more nodes; no later phase was started
    #[error("{failure}")]
    Phase {
        failure: PhaseFailure,
        corrections: Vec<Correction>,
        completed: Vec<PhaseRecord>,
    },
}

/// Serializable summary of any run outcome, for `--report`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunSummary<'a> {
    Success {
        report: &'a ProvisionReport,
    },
    TopologyRejected {
        message: String,
    },
    PhaseFailed {
        failure: &'a PhaseFailure,
        corrections: &'a [Correction],
        completed: &'a [PhaseRecord],
    },
}

impl<'a> RunSummary<'a> {
    pub fn from_result(result: &'a Result<ProvisionReport, ProvisionError>) -> Self {
        match result {
            Ok(report) => RunSummary::Success { report },
            Err(ProvisionError::Topology(e)) => RunSummary::TopologyRejected {
                message: e.to_string(),
            },
            Err(ProvisionError::Phase {
                failure,
                corrections,
                completed,
            }) => RunSummary::PhaseFailed {
                failure,
                corrections,
                completed,
            },
        }
    }
}
