//! Dry-run provisioning and the CLI command paths

use std::fs;

use clusterforge::commands::{plan, provision, render};
use clusterforge::config::TransportKind;
use clusterforge::orchestrator::{ClusterOrchestrator, PhaseId, RunSummary};

use super::helpers::*;

fn dry_run_spec(
    aliases: &'static [&'static str],
    storage: usize,
    query: usize,
) -> ClusterSpec<'static> {
    ClusterSpec {
        aliases,
        replica_factor: 2,
        storage_nodes: storage,
        query_nodes: query,
        transport: "dry-run",
    }
}

#[test]
fn test_builtin_scripts_dry_run() {
    let spec = dry_run_spec(&["master", "data-1", "data-2", "sql-1"], 2, 1);
    let (_temp_dir, config) = load_cluster(&spec, |_| Vec::new());

    assert_eq!(config.transport_kind(false), TransportKind::DryRun);
    let pool = config.build_pool(TransportKind::DryRun).unwrap();
    let orchestrator = ClusterOrchestrator::new(
        config.phase_runner(),
        config.script_catalog().unwrap(),
        config.provision_settings().unwrap(),
    );

    let result = orchestrator.provision(&pool, &config.topology_request());
    let report = result.as_ref().expect("Dry run failed");
    assert_eq!(report.phases.len(), PhaseId::sequence().len());
    assert_eq!(report.groups.storage, vec!["data-1", "data-2"]);

    let json = serde_json::to_value(RunSummary::from_result(&result)).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["report"]["topology"]["replica_factor"], 2);
    assert_eq!(json["report"]["phases"][0]["phase"], "purge");
    assert_eq!(
        json["report"]["phases"][12]["phase"],
        "provision_credentials"
    );
    assert!(!json.to_string().contains("s3cret"));
}

#[test]
fn test_provision_command_writes_report() {
    let spec = dry_run_spec(&["master", "data-1", "data-2", "data-3", "sql-1"], 3, 1);
    let (temp_dir, _config) = load_cluster(&spec, |_| Vec::new());
    let config_path = temp_dir.path().join("cluster.toml");
    let report_path = temp_dir.path().join("report.json");

    provision::execute(Some(config_path.as_path()), true, Some(report_path.as_path()))
        .expect("provision failed");

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["status"], "success");
    assert_eq!(report["report"]["topology"]["replica_factor"], 1);
    assert_eq!(
        report["report"]["corrections"][0]["kind"],
        "odd_storage_for_replication"
    );
    assert_eq!(report["report"]["groups"]["coordinator"], "master");
}

#[test]
fn test_provision_command_reports_topology_rejection() {
    let spec = dry_run_spec(&["master", "data-1"], 1, 1);
    let (temp_dir, _config) = load_cluster(&spec, |_| Vec::new());
    let config_path = temp_dir.path().join("cluster.toml");
    let report_path = temp_dir.path().join("report.json");

    let err = provision::execute(Some(config_path.as_path()), true, Some(report_path.as_path()))
        .unwrap_err();
    assert!(err.to_string().contains("Topology rejected"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["status"], "topology_rejected");
    assert!(report["message"].as_str().unwrap().contains("needs 3"));
}

#[test]
fn test_plan_and_render_commands() {
    let spec = dry_run_spec(&["master", "data-1", "data-2", "sql-1"], 2, 1);
    let (temp_dir, _config) = load_cluster(&spec, |_| Vec::new());
    let config_path = temp_dir.path().join("cluster.toml");

    plan::execute(Some(config_path.as_path())).expect("plan failed");
    for kind in [
        render::ArtifactKind::Coordinator,
        render::ArtifactKind::Storage,
        render::ArtifactKind::Query,
    ] {
        render::execute(Some(config_path.as_path()), kind).expect("render failed");
    }
}

#[test]
fn test_plan_command_rejects_mismatched_pool() {
    let spec = dry_run_spec(&["master", "data-1", "sql-1"], 2, 2);
    let (temp_dir, _config) = load_cluster(&spec, |_| Vec::new());

    assert!(plan::execute(Some(temp_dir.path().join("cluster.toml").as_path())).is_err());
}
