use anyhow::Result;
use clap::{Parser, Subcommand};
use clusterforge::commands::{plan, provision, render};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "CLUSTERFORGE_LOG";

#[derive(Parser)]
#[command(name = "clusterforge")]
#[command(about = "Provision a coordinator/storage/query database cluster over SSH", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the cluster configuration (default: ./cluster.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log step-level detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every provisioning phase against the configured nodes
    Provision {
        /// Log the scripts instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON summary of the run to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the planned topology and phase targets without contacting any node
    Plan,

    /// Print a generated configuration file
    Render {
        #[arg(value_enum)]
        kind: render::ArtifactKind,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    };
    // Logs go to stderr so rendered files on stdout stay clean
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, matches!(cli.command, Commands::Render { .. }));

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Provision { dry_run, report } => {
            provision::execute(config, dry_run, report.as_deref())
        }
        Commands::Plan => plan::execute(config),
        Commands::Render { kind } => render::execute(config, kind),
    }
}
