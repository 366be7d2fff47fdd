//! Request handling: body parsing, the operation dispatch table, and the
//! JSON-always reply envelope.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hosts::{DialogRequest, ExportAudioOpts, ExportVideoOpts, HostAdapter};
use platform::MediaKind;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "host": state.adapter.identity().tag() }))
}

pub async fn handle_op(
    State(state): State<AppState>,
    Path(op): Path<String>,
    body: String,
) -> Response {
    // An empty body means "no arguments"; anything else must parse.
    let payload: Value = if body.trim().is_empty() {
        json!({})
    } else {
        match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => {
                return reply(
                    StatusCode::BAD_REQUEST,
                    json!({ "ok": false, "error": format!("malformed JSON body: {e}") }),
                )
            }
        }
    };

    debug!(%op, "bridge op");
    let adapter = state.adapter.clone();
    let op_for_task = op.clone();
    // Adapter calls block on subprocesses and file waits.
    let outcome =
        tokio::task::spawn_blocking(move || dispatch(adapter.as_ref(), &op_for_task, &payload))
            .await;

    match outcome {
        Ok(Some(value)) => reply(StatusCode::OK, value),
        Ok(None) => reply(
            StatusCode::NOT_FOUND,
            json!({ "ok": false, "error": format!("unknown operation: {op}") }),
        ),
        Err(e) => {
            warn!(%op, "handler crashed: {e}");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": format!("internal error running {op}") }),
            )
        }
    }
}

fn reply(status: StatusCode, value: Value) -> Response {
    (status, Json(value)).into_response()
}

/// The whole `/nle/*` surface. `None` means the operation does not exist.
fn dispatch(adapter: &dyn HostAdapter, op: &str, payload: &Value) -> Option<Value> {
    let value = match op {
        "loadHostScript" => to_value(adapter.load_host_script()),
        "startBackend" => to_value(adapter.start_backend()),
        "stopBackend" => to_value(adapter.stop_backend()),
        "getProjectDir" => to_value(adapter.get_project_dir()),
        "showFileDialog" => to_value(adapter.show_file_dialog(&dialog_request(payload))),
        "exportInOutVideo" => {
            let opts: ExportVideoOpts =
                serde_json::from_value(payload.clone()).unwrap_or_default();
            to_value(adapter.export_in_out_video(&opts))
        }
        "exportInOutAudio" => {
            let opts: ExportAudioOpts =
                serde_json::from_value(payload.clone()).unwrap_or_default();
            to_value(adapter.export_in_out_audio(&opts))
        }
        "importFileToBin" => match required_path(payload) {
            Err(e) => e,
            Ok(path) => {
                let bin = payload.get("binName").and_then(Value::as_str);
                to_value(adapter.import_file_to_bin(&path, bin))
            }
        },
        "insertFileAtPlayhead" => match required_path(payload) {
            Err(e) => e,
            Ok(path) => to_value(adapter.insert_file_at_playhead(&path)),
        },
        "insertAtPlayhead" => match required_str(payload, "jobId") {
            Err(e) => e,
            Ok(job_id) => to_value(adapter.insert_at_playhead(&job_id)),
        },
        "importIntoBin" => match required_str(payload, "jobId") {
            Err(e) => e,
            Ok(job_id) => to_value(adapter.import_into_bin(&job_id)),
        },
        "revealFile" => match required_path(payload) {
            Err(e) => e,
            Ok(path) => to_value(adapter.reveal_file(&path)),
        },
        "ensureDir" => match required_path(payload) {
            Err(e) => e,
            Ok(path) => to_value(adapter.ensure_dir(&path)),
        },
        "fileExists" => match required_path(payload) {
            Err(e) => e,
            Ok(path) => to_value(adapter.file_exists(&path)),
        },
        "readThumbnail" => match required_path(payload) {
            Err(e) => e,
            Ok(path) => to_value(adapter.read_thumbnail(&path)),
        },
        "saveThumbnail" => match (required_path(payload), required_str(payload, "dataUrl")) {
            (Err(e), _) | (_, Err(e)) => e,
            (Ok(path), Ok(url)) => to_value(adapter.save_thumbnail(&path, &url)),
        },
        "diagInOut" => to_value(adapter.diag_in_out()),
        "diag" => to_value(adapter.diag()),
        _ => return None,
    };
    Some(value)
}

fn to_value<T: serde::Serialize>(reply: T) -> Value {
    serde_json::to_value(reply)
        .unwrap_or_else(|e| json!({ "ok": false, "error": format!("unserializable reply: {e}") }))
}

/// Missing arguments are business failures, not protocol errors: the body
/// was valid JSON, it just does not name what the operation needs.
fn required_str(payload: &Value, key: &str) -> Result<String, Value> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| json!({ "ok": false, "error": format!("{key} is required") }))
}

fn required_path(payload: &Value) -> Result<PathBuf, Value> {
    required_str(payload, "path").map(PathBuf::from)
}

fn dialog_request(payload: &Value) -> DialogRequest {
    serde_json::from_value(payload.clone()).unwrap_or(DialogRequest {
        kind: MediaKind::Video,
        path: None,
    })
}
