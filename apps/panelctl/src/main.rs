//! Headless control binary for the panel backend: the same operations the
//! panels run, driveable from a terminal for install debugging.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hosts::{adapter_for, AdapterDeps, HostIdentity};
use nle::detect_host;
use platform::{AppDirs, DebugLog, JOB_SERVER_PORT};
use supervisor::health::INTERACTIVE_TIMEOUT;
use supervisor::{check_health, health_url, BackendSupervisor, LaunchSpec, ProcessLauncher};
use tracing::info;

#[derive(Parser)]
#[command(name = "panelctl")]
#[command(about = "Control and inspect the panel backend from a terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Host to act as (AEFT, PPRO, RESOLVE, FCPX, UXP); detected when omitted.
    #[arg(long, global = true)]
    host: Option<HostIdentity>,

    /// Extension install root (contains bin/, server/, scripts/).
    #[arg(long, global = true, default_value = ".")]
    ext_root: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the job server's health endpoint
    Health,

    /// Start the backend if it is not already running
    Start,

    /// Stop whatever owns the job server port
    Stop,

    /// Print host and timeline diagnostics
    Diag,

    /// Print the application directory tree, creating it if missing
    Dirs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| filter.into()))
        .init();

    let identity = cli
        .host
        .unwrap_or_else(|| detect_host(Some(&cli.ext_root)));
    info!(host = identity.tag(), "acting as host");

    let dirs = AppDirs::resolve();
    dirs.ensure()?;

    match cli.command {
        Commands::Health => {
            let url = health_url(JOB_SERVER_PORT);
            let healthy = check_health(&url, INTERACTIVE_TIMEOUT);
            println!("{}", serde_json::json!({ "url": url, "healthy": healthy }));
        }
        Commands::Dirs => {
            println!(
                "{:#}",
                serde_json::json!({
                    "base": dirs.base,
                    "logs": dirs.logs,
                    "cache": dirs.cache,
                    "state": dirs.state,
                    "uploads": dirs.uploads,
                    "updates": dirs.updates,
                })
            );
        }
        cmd @ (Commands::Start | Commands::Stop | Commands::Diag) => {
            let log = Arc::new(DebugLog::for_host(&dirs.logs, identity.log_tag()));
            let launcher = ProcessLauncher::new(
                LaunchSpec::new(&cli.ext_root, identity.tag()),
                log.clone(),
            );
            let supervisor = Arc::new(BackendSupervisor::new(
                Arc::new(launcher),
                JOB_SERVER_PORT,
                log.clone(),
            ));
            let adapter = adapter_for(
                identity,
                AdapterDeps {
                    supervisor,
                    dirs,
                    ext_root: cli.ext_root.clone(),
                    log,
                    script_bridge: None,
                },
            );
            let value = match cmd {
                Commands::Start => serde_json::to_value(adapter.start_backend())?,
                Commands::Stop => serde_json::to_value(adapter.stop_backend())?,
                _ => serde_json::to_value(adapter.diag())?,
            };
            println!("{value:#}");
        }
    }

    Ok(())
}
