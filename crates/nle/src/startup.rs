//! Panel startup sequence: probe, spawn if needed, poll, then tell the UI.
//! The panel renders immediately in a "connecting" state; features unlock
//! only when [`PanelEvent::BackendReady`] arrives, and a panel that never
//! gets one stays usable in offline mode instead of hanging.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use supervisor::{poll_until, PollOptions};
use tracing::{info, warn};

use crate::client::JobServerClient;
use crate::facade::Nle;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    BackendReady {
        port: u16,
        /// False when this startup actually spawned the server.
        already_running: bool,
    },
    Offline {
        error: Option<String>,
    },
}

pub struct StartupOptions {
    pub port: u16,
    pub poll: PollOptions,
}

impl StartupOptions {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            poll: PollOptions::startup(),
        }
    }
}

/// Run the startup sequence on a worker thread. The returned channel yields
/// exactly one event.
pub fn start_panel(
    nle: Arc<Nle>,
    client: Arc<JobServerClient>,
    opts: StartupOptions,
) -> Receiver<PanelEvent> {
    let (tx, rx) = bounded(1);
    std::thread::spawn(move || {
        let event = run_sequence(&nle, &client, &opts);
        match &event {
            PanelEvent::BackendReady { port, .. } => info!(port, "backend ready"),
            PanelEvent::Offline { error } => warn!(?error, "panel entering offline mode"),
        }
        let _ = tx.send(event);
    });
    rx
}

fn run_sequence(nle: &Nle, client: &JobServerClient, opts: &StartupOptions) -> PanelEvent {
    if client.health() {
        return PanelEvent::BackendReady {
            port: opts.port,
            already_running: true,
        };
    }

    let start = nle.start_backend();
    if !start.ok {
        return PanelEvent::Offline { error: start.error };
    }

    if poll_until(opts.poll, || client.health()) {
        PanelEvent::BackendReady {
            port: opts.port,
            already_running: start.already_running == Some(true),
        }
    } else {
        PanelEvent::Offline {
            error: Some("backend did not become healthy in time".to_string()),
        }
    }
}
