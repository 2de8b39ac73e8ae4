//! Shared helpers for provisioning integration tests

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use clusterforge::config::ClusterConfig;
use clusterforge::scripts::StepId;

/// Shape of a test cluster
pub struct ClusterSpec<'a> {
    pub aliases: &'a [&'a str],
    pub replica_factor: i64,
    pub storage_nodes: usize,
    pub query_nodes: usize,
    pub transport: &'a str,
}

/// Test helper: write a `cluster.toml` and return its path
pub fn write_config(dir: &Path, spec: &ClusterSpec<'_>, scripts: &[(StepId, String)]) -> PathBuf {
    let mut content = String::new();
    writeln!(content, "[cluster]").unwrap();
    writeln!(content, "replica_factor = {}", spec.replica_factor).unwrap();
    writeln!(content, "storage_nodes = {}", spec.storage_nodes).unwrap();
    writeln!(content, "query_nodes = {}", spec.query_nodes).unwrap();

    writeln!(content, "\n[credentials]").unwrap();
    writeln!(content, "db_user = \"cluster_admin\"").unwrap();
    writeln!(content, "db_password = \"s3cret'pw\"").unwrap();

    writeln!(content, "\n[transport]").unwrap();
    writeln!(content, "kind = \"{}\"", spec.transport).unwrap();
    writeln!(content, "command_timeout_secs = 30").unwrap();

    if !scripts.is_empty() {
        writeln!(content, "\n[scripts]").unwrap();
        for (step, script) in scripts {
            writeln!(content, "{} = '''{}'''", step.name(), script).unwrap();
        }
    }

    for (i, alias) in spec.aliases.iter().enumerate() {
        writeln!(content, "\n[[nodes]]").unwrap();
        writeln!(content, "alias = \"{alias}\"").unwrap();
        writeln!(content, "address = \"10.1.0.{}\"", i + 1).unwrap();
    }

    let path = dir.join("cluster.toml");
    fs::write(&path, content).expect("Failed to write cluster.toml");
    path
}

/// Test helper: every step appends the node alias to `<dir>/<step>.log`
pub fn marker_scripts(dir: &Path) -> Vec<(StepId, String)> {
    StepId::all()
        .iter()
        .map(|step| {
            (
                *step,
                format!(
                    "echo \"${{NODE_ALIAS}}\" >> {}/{}.log",
                    dir.display(),
                    step.name()
                ),
            )
        })
        .collect()
}

/// Test helper: replace the script of `step` in `scripts`
pub fn override_step(scripts: &mut [(StepId, String)], step: StepId, script: String) {
    for (id, existing) in scripts.iter_mut() {
        if *id == step {
            *existing = script.clone();
        }
    }
}

/// Test helper: aliases recorded in `<dir>/<step>.log`, sorted
pub fn markers(dir: &Path, step: StepId) -> Vec<String> {
    let path = dir.join(format!("{}.log", step.name()));
    let mut lines: Vec<String> = fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default();
    lines.sort();
    lines
}

/// Test helper: temp dir plus a loaded config for it
pub fn load_cluster(
    spec: &ClusterSpec<'_>,
    scripts: impl FnOnce(&Path) -> Vec<(StepId, String)>,
) -> (TempDir, ClusterConfig) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let scripts = scripts(temp_dir.path());
    let path = write_config(temp_dir.path(), spec, &scripts);
    let config = ClusterConfig::load(&path).expect("Failed to load cluster.toml");
    (temp_dir, config)
}
