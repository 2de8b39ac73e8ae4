//! `clusterforge plan`

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use super::{load_config, print_corrections};
use crate::config::NodeEntry;
use crate::orchestrator::plan_phases;
use crate::topology::{Role, TopologyPlanner};

/// Show the planned topology and the nodes each phase would touch.
/// Nothing is contacted and no credentials are resolved.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let planner = TopologyPlanner;

    let planned = match planner.plan(config.nodes.len(), &config.topology_request()) {
        Ok(planned) => planned,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), e);
            bail!("Topology rejected")
        }
    };
    let groups = planner.assign_roles(&config.nodes, &planned.topology)?;

    println!("{}", "Topology".bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "  Replica factor: {}",
        planned.topology.replica_factor.to_string().bold()
    );
    print_corrections(&planned.corrections);

    for role in [Role::Coordinator, Role::Storage, Role::Query] {
        let members: Vec<String> = groups.group(role).iter().map(describe_node).collect();
        let members = if members.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            members.join(", ")
        };
        println!("  {:<12} {}", role.to_string().cyan(), members);
    }

    println!("\n{}", "Phases".bold());
    println!("{}", "─".repeat(40).dimmed());
    let plan = plan_phases(&groups, |entry: &NodeEntry| entry.alias.clone());
    for (index, phase) in plan.iter().enumerate() {
        let steps: Vec<&str> = phase.steps.iter().map(|s| s.name()).collect();
        println!(
            "  {:>2}. {:<26} {} {}",
            index + 1,
            phase.phase.name(),
            format!("[{}]", phase.target).dimmed(),
            phase.nodes.join(", ")
        );
        if steps.len() > 1 {
            println!("      {}", steps.join(" → ").dimmed());
        }
    }

    Ok(())
}

fn describe_node(entry: &NodeEntry) -> String {
    if entry.address() == entry.alias {
        entry.alias.clone()
    } else {
        format!("{} ({})", entry.alias, entry.address())
    }
}
