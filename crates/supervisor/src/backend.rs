//! Single-flight backend supervisor. "Ensure the job server is running" is
//! safe to call from any number of places at once; at most one spawn attempt
//! is ever in flight, and a crashed server can be started again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use platform::DebugLog;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::health::{check_health, health_url, LIVENESS_TIMEOUT};
use crate::launcher::Launcher;

/// Outcome of `ensure_running`, shaped for the `/nle/startBackend` wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StartReply {
    pub fn already_running() -> Self {
        Self {
            ok: true,
            already_running: Some(true),
            spawned: None,
            healthy: None,
            error: None,
        }
    }

    pub fn spawned(healthy: bool) -> Self {
        Self {
            ok: true,
            already_running: None,
            spawned: Some(true),
            healthy: Some(healthy),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            already_running: None,
            spawned: None,
            healthy: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct SupervisorState {
    /// Held from the moment a spawn attempt starts until the child exits.
    /// Concurrent callers that lose the race report `alreadyRunning` and
    /// pick up the result through their own later health polls.
    lock: AtomicBool,
    healthy: AtomicBool,
    pid: Mutex<Option<u32>>,
    last_error: Mutex<Option<String>>,
}

pub struct BackendSupervisor {
    launcher: Arc<dyn Launcher>,
    port: u16,
    settle: Duration,
    probe_timeout: Duration,
    state: Arc<SupervisorState>,
    log: Arc<DebugLog>,
}

impl BackendSupervisor {
    pub fn new(launcher: Arc<dyn Launcher>, port: u16, log: Arc<DebugLog>) -> Self {
        Self {
            launcher,
            port,
            // Cold starts routinely take a couple of seconds; one settle
            // pause before the post-spawn probe, further polling is the
            // caller's job.
            settle: Duration::from_millis(2000),
            probe_timeout: LIVENESS_TIMEOUT,
            state: Arc::new(SupervisorState {
                lock: AtomicBool::new(false),
                healthy: AtomicBool::new(false),
                pid: Mutex::new(None),
                last_error: Mutex::new(None),
            }),
            log,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn health_url(&self) -> String {
        health_url(self.port)
    }

    /// Last known probe result; does not touch the network.
    pub fn is_healthy(&self) -> bool {
        self.state.healthy.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.last_error.lock().clone()
    }

    /// Probe and cache liveness.
    pub fn probe(&self) -> bool {
        let healthy = check_health(&self.health_url(), self.probe_timeout);
        self.state.healthy.store(healthy, Ordering::SeqCst);
        healthy
    }

    /// Idempotent start. Healthy server or in-flight spawn both report
    /// `alreadyRunning`; a spawn reports success even when the post-settle
    /// probe is still negative, since some hosts cold-start slowly and the
    /// caller keeps polling.
    pub fn ensure_running(&self) -> StartReply {
        if self
            .state
            .lock
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return StartReply::already_running();
        }

        if self.probe() {
            self.state.lock.store(false, Ordering::SeqCst);
            return StartReply::already_running();
        }

        match self.launcher.launch() {
            Err(err) => {
                let msg = err.to_string();
                warn!("backend launch failed: {msg}");
                self.log.line(&format!("launch failed: {msg}"));
                *self.state.last_error.lock() = Some(msg.clone());
                self.state.lock.store(false, Ordering::SeqCst);
                StartReply::failed(msg)
            }
            Ok(backend) => {
                *self.state.pid.lock() = backend.pid;
                if let Some(child) = backend.child {
                    self.watch(child);
                }
                std::thread::sleep(self.settle);
                let healthy = self.probe();
                info!(healthy, "backend spawned");
                self.log.line(&format!("backend spawned, healthy={healthy}"));
                StartReply::spawned(healthy)
            }
        }
    }

    /// Reap the child in the background so a crash releases the spawn lock
    /// and a later `ensure_running` can try again.
    fn watch(&self, mut child: std::process::Child) {
        let state = self.state.clone();
        let log = self.log.clone();
        std::thread::spawn(move || {
            let status = child.wait();
            log.line(&format!("backend exited: {status:?}"));
            *state.pid.lock() = None;
            state.healthy.store(false, Ordering::SeqCst);
            state.lock.store(false, Ordering::SeqCst);
        });
    }

    /// Kill whatever currently owns the job server port. Used for the
    /// explicit `stopBackend` action; the server otherwise outlives the
    /// panel on purpose to avoid cold starts on reopen.
    pub fn stop(&self) -> StopReply {
        let port = self.port;
        let result = if cfg!(windows) {
            std::process::Command::new("cmd")
                .args([
                    "/C",
                    &format!(
                        "for /f \"tokens=5\" %a in ('netstat -aon ^| findstr :{port}') do taskkill /f /pid %a"
                    ),
                ])
                .output()
        } else {
            std::process::Command::new("sh")
                .args([
                    "-c",
                    &format!("lsof -tiTCP:{port} | xargs kill -9 2>/dev/null || true"),
                ])
                .output()
        };

        match result {
            Ok(_) => {
                self.state.healthy.store(false, Ordering::SeqCst);
                self.log.line("stopBackend issued");
                StopReply {
                    ok: true,
                    message: Some("Backend stopped".to_string()),
                    error: None,
                }
            }
            Err(err) => StopReply {
                ok: false,
                message: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_reply_wire_shape() {
        let v = serde_json::to_value(StartReply::already_running()).unwrap();
        assert_eq!(v["ok"], true);
        assert_eq!(v["alreadyRunning"], true);
        assert!(v.get("spawned").is_none());

        let v = serde_json::to_value(StartReply::spawned(false)).unwrap();
        assert_eq!(v["spawned"], true);
        assert_eq!(v["healthy"], false);

        let v = serde_json::to_value(StartReply::failed("boom")).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"], "boom");
    }
}
