//! `clusterforge provision`

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::info;

use super::{load_config, print_corrections};
use crate::config::TransportKind;
use crate::orchestrator::{ClusterOrchestrator, ProvisionError, ProvisionReport, RunSummary};
use crate::phase::PhaseFailure;

/// Provision the cluster described by the configuration.
/// Usage: clusterforge provision [--dry-run] [--report <path>]
pub fn execute(
    config_path: Option<&Path>,
    dry_run: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;

    let kind = config.transport_kind(dry_run);
    let pool = config.build_pool(kind)?;
    let orchestrator = ClusterOrchestrator::new(
        config.phase_runner(),
        config.script_catalog()?,
        config.provision_settings()?,
    );

    if kind == TransportKind::DryRun {
        println!(
            "{} Dry run {}",
            "→".cyan().bold(),
            "(scripts are logged, nothing is executed)".dimmed()
        );
    }
    println!(
        "{} Provisioning {} node(s)...",
        "→".cyan().bold(),
        pool.len().to_string().bold()
    );
    info!(nodes = pool.len(), transport = ?kind, "starting provisioning run");

    let result = orchestrator.provision(&pool, &config.topology_request());

    if let Some(path) = report_path {
        write_report(path, &result)?;
    }

    match &result {
        Ok(report) => {
            print_success(report);
            Ok(())
        }
        Err(ProvisionError::Topology(e)) => {
            println!("\n{} {}", "✗".red().bold(), e);
            bail!("Topology rejected; no node was contacted")
        }
        Err(ProvisionError::Phase {
            failure,
            corrections,
            completed,
        }) => {
            print_corrections(corrections);
            for record in completed {
                println!("  {} {}", "✓".green().bold(), record.phase);
            }
            print_failure(failure);
            bail!("Provisioning stopped at phase '{}'", failure.phase)
        }
    }
}

fn write_report(path: &Path, result: &Result<ProvisionReport, ProvisionError>) -> Result<()> {
    let summary = RunSummary::from_result(result);
    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run report to {}", path.display()))?;
    info!(path = %path.display(), "run report written");
    Ok(())
}

fn print_success(report: &ProvisionReport) {
    println!();
    println!("{}", "╭──────────────────────────────────────╮".cyan());
    println!("{}", "│        Cluster Provisioned           │".cyan().bold());
    println!("{}", "╰──────────────────────────────────────╯".cyan());

    if !report.corrections.is_empty() {
        println!("\n{}", "Corrections".yellow().bold());
        println!("{}", "─".repeat(40).dimmed());
        print_corrections(&report.corrections);
    }

    println!(
        "\n{} {}",
        "Phases".green().bold(),
        format!("({})", report.phases.len()).dimmed()
    );
    println!("{}", "─".repeat(40).dimmed());
    for record in &report.phases {
        println!(
            "  {} {:<26} {}",
            "✓".green().bold(),
            record.phase.name(),
            format!("{}ms", record.duration_ms).dimmed()
        );
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());
    println!(
        "Replica factor: {}",
        report.topology.replica_factor.to_string().bold()
    );
    println!("Coordinator:    {}", report.groups.coordinator.bold());
    println!("Storage:        {}", report.groups.storage.join(", "));
    println!("Query:          {}", report.groups.query.join(", "));
}

fn print_failure(failure: &PhaseFailure) {
    println!();
    println!(
        "{} {}",
        "Failed".red().bold(),
        format!("({})", failure.failures.len()).dimmed()
    );
    println!("{}", "─".repeat(40).dimmed());
    for error in &failure.failures {
        println!("  {} {}", "✗".red().bold(), error);
        if let Some(tail) = error.output_tail() {
            for line in tail.lines() {
                println!("      {}", line.dimmed());
            }
        }
    }
}
