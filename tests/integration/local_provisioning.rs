//! Full provisioning runs against local shells
//!
//! Every node runs its scripts with `sh -c` on this host. Step scripts are
//! replaced with markers so each test can see which node ran which step.

use std::path::Path;

use clusterforge::config::{ClusterConfig, TransportKind};
use clusterforge::orchestrator::{ClusterOrchestrator, PhaseId, ProvisionError};
use clusterforge::phase::OpError;
use clusterforge::scripts::StepId;
use clusterforge::topology::{Correction, ReplicaFactor, TopologyError};

use super::helpers::*;

fn orchestrator(config: &ClusterConfig) -> ClusterOrchestrator {
    ClusterOrchestrator::new(
        config.phase_runner(),
        config.script_catalog().expect("Failed to build script catalog"),
        config.provision_settings().expect("Failed to resolve settings"),
    )
}

fn local(aliases: &'static [&'static str], storage: usize, query: usize) -> ClusterSpec<'static> {
    ClusterSpec {
        aliases,
        replica_factor: 2,
        storage_nodes: storage,
        query_nodes: query,
        transport: "local",
    }
}

#[test]
fn test_three_node_cluster_provisions() {
    let spec = ClusterSpec {
        replica_factor: 1,
        ..local(&["master", "data-1", "sql-1"], 1, 1)
    };
    let (temp_dir, config) = load_cluster(&spec, marker_scripts);
    let dir = temp_dir.path();

    let pool = config
        .build_pool(config.transport_kind(false))
        .expect("Failed to build pool");
    let report = orchestrator(&config)
        .provision(&pool, &config.topology_request())
        .expect("Provisioning failed");

    assert_eq!(report.phases.len(), PhaseId::sequence().len());
    assert!(report.corrections.is_empty());

    assert_eq!(markers(dir, StepId::Purge), vec!["data-1", "master", "sql-1"]);
    assert_eq!(markers(dir, StepId::FetchPackage), vec!["data-1", "master", "sql-1"]);
    assert_eq!(markers(dir, StepId::InstallPrerequisites), vec!["data-1", "sql-1"]);
    assert_eq!(markers(dir, StepId::StartCoordinator), vec!["master"]);
    assert_eq!(markers(dir, StepId::StartStorageNode), vec!["data-1"]);
    assert_eq!(markers(dir, StepId::InitializeDatabase), vec!["sql-1"]);
    assert_eq!(markers(dir, StepId::ProvisionCredentials), vec!["sql-1"]);
}

#[test]
fn test_odd_storage_count_runs_with_replica_factor_one() {
    let spec = local(&["master", "data-1", "data-2", "data-3", "sql-1"], 3, 1);
    let (temp_dir, config) = load_cluster(&spec, |dir| {
        let mut scripts = marker_scripts(dir);
        override_step(
            &mut scripts,
            StepId::ConfigureCoordinator,
            format!(
                "printf \"%s\\n\" \"${{COORDINATOR_CONFIG}}\" > {}/config.ini",
                dir.display()
            ),
        );
        scripts
    });
    let dir = temp_dir.path();

    let pool = config.build_pool(TransportKind::Local).unwrap();
    let report = orchestrator(&config)
        .provision(&pool, &config.topology_request())
        .expect("Provisioning failed");

    assert_eq!(report.topology.replica_factor, ReplicaFactor::One);
    assert_eq!(
        report.corrections,
        vec![Correction::OddStorageForReplication { storage_nodes: 3 }]
    );
    assert_eq!(
        markers(dir, StepId::StartStorageNode),
        vec!["data-1", "data-2", "data-3"]
    );

    let config_ini = std::fs::read_to_string(dir.join("config.ini")).unwrap();
    assert!(config_ini.contains("NoOfReplicas=1"));
    assert!(config_ini.contains("[ndb_mgmd]\nhostname=10.1.0.1"));
    assert_eq!(config_ini.matches("[ndbd]").count(), 3);
    assert!(config_ini.contains("[mysqld]\nhostname=10.1.0.5"));
}

#[test]
fn test_pool_size_mismatch_contacts_no_node() {
    let spec = local(&["master", "data-1", "sql-1", "spare"], 1, 1);
    let (temp_dir, config) = load_cluster(&spec, marker_scripts);

    let pool = config.build_pool(TransportKind::Local).unwrap();
    let err = orchestrator(&config)
        .provision(&pool, &config.topology_request())
        .unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::Topology(TopologyError::SizeMismatch {
            pool_size: 4,
            expected: 3,
            ..
        })
    ));
    assert_no_markers(temp_dir.path());
}

#[test]
fn test_failure_on_one_node_halts_after_that_phase() {
    let spec = local(&["master", "data-1", "data-2", "data-3", "sql-1"], 3, 1);
    let (temp_dir, config) = load_cluster(&spec, |dir| {
        let mut scripts = marker_scripts(dir);
        override_step(
            &mut scripts,
            StepId::FetchPackage,
            format!(
                "echo \"${{NODE_ALIAS}}\" >> {}/fetch_package.log; \
                 if [ \"${{NODE_ALIAS}}\" = data-2 ]; then echo \"download failed\" >&2; exit 7; fi",
                dir.display()
            ),
        );
        scripts
    });
    let dir = temp_dir.path();

    let pool = config.build_pool(TransportKind::Local).unwrap();
    let err = orchestrator(&config)
        .provision(&pool, &config.topology_request())
        .unwrap_err();

    let ProvisionError::Phase {
        failure, completed, ..
    } = err
    else {
        panic!("expected a phase failure");
    };

    assert_eq!(failure.phase, "fetch_package");
    assert_eq!(failure.failed_nodes(), vec!["data-2"]);
    match &failure.failures[0] {
        OpError::RemoteFailure {
            exit_status, stderr, ..
        } => {
            assert_eq!(*exit_status, Some(7));
            assert!(stderr.contains("download failed"));
        }
        other => panic!("expected a remote failure, got {other:?}"),
    }
    assert_eq!(completed.len(), 2);

    // the barrier lets every node finish the failing phase
    assert_eq!(markers(dir, StepId::FetchPackage).len(), 5);
    for step in [
        StepId::StageCoordinatorFiles,
        StepId::StageStorageFiles,
        StepId::StageQueryFiles,
        StepId::StartCoordinator,
        StepId::ProvisionCredentials,
    ] {
        assert!(markers(dir, step).is_empty(), "{step} should not have run");
    }
}

#[test]
fn test_credentials_reach_query_nodes_escaped() {
    let spec = local(&["master", "data-1", "data-2", "sql-1", "sql-2"], 2, 2);
    let (temp_dir, config) = load_cluster(&spec, |dir| {
        let mut scripts = marker_scripts(dir);
        override_step(
            &mut scripts,
            StepId::ProvisionCredentials,
            format!(
                "cat > {}/grant-${{NODE_ALIAS}}.sql << \"EOF\"\n\
                 GRANT ALL ON *.* TO \"${{DB_USER}}\" IDENTIFIED BY \"${{DB_PASSWORD}}\";\n\
                 EOF",
                dir.display()
            ),
        );
        scripts
    });
    let dir = temp_dir.path();

    let pool = config.build_pool(TransportKind::Local).unwrap();
    orchestrator(&config)
        .provision(&pool, &config.topology_request())
        .expect("Provisioning failed");

    for alias in ["sql-1", "sql-2"] {
        let grant = std::fs::read_to_string(dir.join(format!("grant-{alias}.sql"))).unwrap();
        assert!(grant.contains("\"cluster_admin\""));
        assert!(grant.contains("\"s3cret''pw\""));
    }
    assert!(!dir.join("grant-master.sql").exists());
    assert!(!dir.join("grant-data-1.sql").exists());
}

fn assert_no_markers(dir: &Path) {
    for step in StepId::all() {
        assert!(markers(dir, *step).is_empty(), "{step} should not have run");
    }
}
