pub mod plan;
pub mod provision;
pub mod render;

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing::debug;

use crate::config::{resolve_config_path, ClusterConfig};
use crate::topology::Correction;

/// Locate and load the run configuration
pub fn load_config(explicit: Option<&Path>) -> Result<ClusterConfig> {
    let path = resolve_config_path(explicit);
    debug!(path = %path.display(), "loading configuration");
    ClusterConfig::load(&path)
}

fn print_corrections(corrections: &[Correction]) {
    for correction in corrections {
        println!("  {} {}", "⚠".yellow().bold(), correction);
    }
}
