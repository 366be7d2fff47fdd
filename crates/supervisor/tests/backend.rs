use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use platform::DebugLog;
use supervisor::{
    BackendSupervisor, LaunchError, LaunchSpec, LaunchedBackend, Launcher, ProcessLauncher,
};

/// Serves HTTP 200 to every connection until the process exits.
fn serve_health(listener: TcpListener) {
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok");
        }
    });
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

struct CountingLauncher {
    launches: AtomicUsize,
    /// Port to start serving health on when "launched"; None leaves the
    /// backend dead.
    serve_on: Option<u16>,
}

impl CountingLauncher {
    fn new(serve_on: Option<u16>) -> Arc<Self> {
        Arc::new(Self {
            launches: AtomicUsize::new(0),
            serve_on,
        })
    }

    fn count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl Launcher for CountingLauncher {
    fn launch(&self) -> Result<LaunchedBackend, LaunchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if let Some(port) = self.serve_on {
            let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
            serve_health(listener);
        }
        Ok(LaunchedBackend {
            pid: None,
            child: None,
        })
    }
}

fn supervisor_for(launcher: Arc<CountingLauncher>, port: u16) -> BackendSupervisor {
    BackendSupervisor::new(launcher, port, Arc::new(DebugLog::disabled()))
        .with_settle(Duration::from_millis(50))
        .with_probe_timeout(Duration::from_millis(200))
}

#[test]
fn concurrent_ensure_running_spawns_exactly_once() {
    let port = free_port();
    let launcher = CountingLauncher::new(None);
    let sup = Arc::new(supervisor_for(launcher.clone(), port));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let sup = sup.clone();
        handles.push(std::thread::spawn(move || sup.ensure_running()));
    }
    let replies: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(launcher.count(), 1, "only one spawn attempt may happen");
    assert!(replies.iter().all(|r| r.ok), "every caller must resolve ok");
    assert_eq!(
        replies.iter().filter(|r| r.spawned == Some(true)).count(),
        1
    );
    assert_eq!(
        replies
            .iter()
            .filter(|r| r.already_running == Some(true))
            .count(),
        7
    );
}

#[test]
fn healthy_server_short_circuits_without_spawning() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    serve_health(listener);

    let launcher = CountingLauncher::new(None);
    let sup = supervisor_for(launcher.clone(), port);

    let reply = sup.ensure_running();
    assert!(reply.ok);
    assert_eq!(reply.already_running, Some(true));
    assert_eq!(launcher.count(), 0);
    assert!(sup.is_healthy());
}

#[test]
fn spawn_then_healthy_after_settle() {
    let port = free_port();
    let launcher = CountingLauncher::new(Some(port));
    let sup = supervisor_for(launcher.clone(), port);

    let reply = sup.ensure_running();
    assert!(reply.ok);
    assert_eq!(reply.spawned, Some(true));
    assert_eq!(reply.healthy, Some(true));
    assert_eq!(launcher.count(), 1);
}

#[test]
fn spawn_reports_ok_even_when_still_unhealthy() {
    // Backend "starts" but never serves; spawning still counts as success,
    // further polling is the caller's responsibility.
    let port = free_port();
    let launcher = CountingLauncher::new(None);
    let sup = supervisor_for(launcher.clone(), port);

    let reply = sup.ensure_running();
    assert!(reply.ok);
    assert_eq!(reply.spawned, Some(true));
    assert_eq!(reply.healthy, Some(false));
}

#[test]
fn missing_install_fails_without_spawn_and_releases_lock() {
    let tmp = tempfile::tempdir().unwrap();
    let port = free_port();
    let launcher = Arc::new(ProcessLauncher::new(
        LaunchSpec::new(tmp.path(), "PPRO"),
        Arc::new(DebugLog::disabled()),
    ));
    let sup = BackendSupervisor::new(launcher, port, Arc::new(DebugLog::disabled()))
        .with_settle(Duration::from_millis(10))
        .with_probe_timeout(Duration::from_millis(200));

    let reply = sup.ensure_running();
    assert!(!reply.ok);
    assert_eq!(reply.error.as_deref(), Some("Node binary or server file missing"));
    assert_eq!(sup.last_error().as_deref(), Some("Node binary or server file missing"));

    // The failed attempt must not poison later attempts.
    let reply2 = sup.ensure_running();
    assert!(!reply2.ok, "still broken install, but attempt was made again");
}
