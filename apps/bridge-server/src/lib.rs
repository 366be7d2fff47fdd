//! Local HTTP bridge for hosts whose panel UI runs in a plain webview
//! (Resolve's workflow plugin, the FCPX workflow extension). The panel
//! speaks `POST /nle/<op>` with a JSON body (GET works for the read-only
//! ops); this server owns the actual host adapter and the backend
//! supervisor.
//!
//! Reply contract: every `/nle/*` response is JSON with a boolean `ok`.
//! Business failures are HTTP 200 with `ok: false`; only a malformed body
//! (400), an unknown operation (404), or a crashed handler (500) use error
//! statuses, and even those carry the same JSON shape.

pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use hosts::HostAdapter;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<dyn HostAdapter>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        // Read-only ops (getProjectDir, diagInOut, diag) are also reachable
        // over GET; the handler treats a missing body as no arguments.
        .route("/nle/:op", get(routes::handle_op).post(routes::handle_op))
        // The panel webview is served from a file:// or host-app origin.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
