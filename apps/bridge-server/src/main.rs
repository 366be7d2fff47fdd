use std::path::PathBuf;
use std::sync::Arc;

use bridge_server::{router, AppState};
use clap::{Parser, ValueEnum};
use hosts::{adapter_for, AdapterDeps, HostIdentity};
use platform::{AppDirs, DebugLog, JOB_SERVER_PORT};
use supervisor::{BackendSupervisor, LaunchSpec, ProcessLauncher};
use tracing::info;

/// Host families that need the HTTP bridge. The CEP hosts talk to their
/// adapter in-process and never run this binary.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum HostFamily {
    Resolve,
    Fcpx,
}

impl From<HostFamily> for HostIdentity {
    fn from(family: HostFamily) -> Self {
        match family {
            HostFamily::Resolve => HostIdentity::Resolve,
            HostFamily::Fcpx => HostIdentity::Fcpx,
        }
    }
}

#[derive(Parser)]
#[command(name = "bridge-server", about = "Local host bridge for panel webviews")]
struct Args {
    /// Host family this bridge serves.
    #[arg(long, value_enum)]
    host: HostFamily,

    /// Listen port; defaults to the host family's well-known port.
    #[arg(long)]
    port: Option<u16>,

    /// Extension install root (contains bin/, server/, scripts/).
    #[arg(long, default_value = ".")]
    ext_root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "bridge_server=info,axum=info".into()),
        )
        .init();

    let args = Args::parse();
    let identity: HostIdentity = args.host.into();
    let port = args
        .port
        .or(identity.bridge_port())
        .expect("bridge hosts always have a well-known port");

    let dirs = AppDirs::resolve();
    dirs.ensure()?;
    let log = Arc::new(DebugLog::for_host(&dirs.logs, identity.log_tag()));

    let launcher = ProcessLauncher::new(
        LaunchSpec::new(&args.ext_root, identity.tag()),
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
            ext_root: args.ext_root.clone(),
            log: log.clone(),
            script_bridge: None,
        },
    );

    let app = router(AppState {
        adapter: Arc::from(adapter),
    });

    let addr = format!("127.0.0.1:{port}");
    info!(host = identity.tag(), %addr, "bridge server listening");
    log.line(&format!("bridge server listening on {addr}"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
