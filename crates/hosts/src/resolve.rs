//! Adapter for DaVinci Resolve. Resolve has no in-panel script engine to
//! call into; every operation shells out to the bundled Python bridge
//! (`scripts/resolve_bridge.py <op> <json>`), which talks to the Resolve
//! scripting API and prints exactly one JSON object on stdout.
//!
//! Unlike the CEP path there is no legacy-reply heuristic here: the bridge
//! is ours, so anything that is not clean JSON is a hard failure.

use std::path::{Path, PathBuf};
use std::process::Command;

use platform::MediaPolicy;
use serde_json::{json, Value};
use supervisor::{StartReply, StopReply};
use tracing::debug;

use crate::adapter::{await_export, reveal_in_file_manager, AdapterCore, HostAdapter};
use crate::dialog::validate_selection;
use crate::models::{
    decode_reply, DiagReply, DialogRequest, DialogResult, DirReply, ExportAudioOpts, ExportReply,
    ExportVideoOpts, FromError, OpReply,
};
use crate::HostIdentity;

pub struct ResolveAdapter {
    python: String,
    bridge_script: PathBuf,
    core: AdapterCore,
}

impl ResolveAdapter {
    pub fn new(ext_root: PathBuf, core: AdapterCore) -> Self {
        let python = if cfg!(windows) { "python" } else { "python3" };
        Self {
            python: python.to_string(),
            bridge_script: ext_root.join("scripts").join("resolve_bridge.py"),
            core,
        }
    }

    #[cfg(test)]
    fn with_python(mut self, python: impl Into<String>, script: PathBuf) -> Self {
        self.python = python.into();
        self.bridge_script = script;
        self
    }

    fn call(&self, op: &str, payload: &Value) -> Value {
        debug!(op, "resolve bridge call");
        let output = Command::new(&self.python)
            .arg(&self.bridge_script)
            .arg(op)
            .arg(payload.to_string())
            .output();

        let output = match output {
            Ok(o) => o,
            Err(e) => {
                self.core.log.line(&format!("resolve bridge spawn failed: {e}"));
                return json!({ "ok": false, "error": format!("cannot run Resolve bridge: {e}") });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return json!({
                "ok": false,
                "error": format!(
                    "Resolve bridge exited with {}: {}",
                    output.status,
                    stderr.trim()
                ),
            });
        }

        match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(v) if v.get("ok").map(Value::is_boolean) == Some(true) => v,
            Ok(_) | Err(_) => json!({ "ok": false, "error": "Invalid JSON from Resolve bridge" }),
        }
    }

    fn insert_path(&self, path: &Path) -> OpReply {
        decode_reply(self.call(
            "insertFileAtPlayhead",
            &json!({ "path": path.to_string_lossy() }),
        ))
    }

    fn import_path(&self, path: &Path, bin_name: Option<&str>) -> OpReply {
        decode_reply(self.call(
            "importFileToBin",
            &json!({ "path": path.to_string_lossy(), "binName": bin_name }),
        ))
    }
}

impl HostAdapter for ResolveAdapter {
    fn identity(&self) -> HostIdentity {
        HostIdentity::Resolve
    }

    fn start_backend(&self) -> StartReply {
        self.core.start_backend()
    }

    fn stop_backend(&self) -> StopReply {
        self.core.stop_backend()
    }

    fn get_project_dir(&self) -> DirReply {
        let reply: DirReply = decode_reply(self.call("getProjectDir", &json!({})));
        if reply.ok && reply.location().is_some() {
            reply
        } else {
            self.core.default_output_dir()
        }
    }

    /// Resolve panels run in a plain webview with its own picker; the
    /// adapter only validates what that picker selected.
    fn show_file_dialog(&self, req: &DialogRequest) -> DialogResult {
        let policy = MediaPolicy::for_kind(req.kind);
        match &req.path {
            Some(path) => validate_selection(&policy, Path::new(path)),
            None => DialogResult::from_error(
                "No native file dialog on this host; pick a file in the panel first",
            ),
        }
    }

    fn export_in_out_video(&self, opts: &ExportVideoOpts) -> ExportReply {
        let reply = decode_reply(self.call(
            "exportInOutVideo",
            &serde_json::to_value(opts).unwrap_or_else(|_| json!({})),
        ));
        await_export(reply)
    }

    fn export_in_out_audio(&self, opts: &ExportAudioOpts) -> ExportReply {
        let reply = decode_reply(self.call(
            "exportInOutAudio",
            &serde_json::to_value(opts).unwrap_or_else(|_| json!({})),
        ));
        await_export(reply)
    }

    fn import_file_to_bin(&self, path: &Path, bin_name: Option<&str>) -> OpReply {
        self.import_path(path, bin_name)
    }

    fn insert_file_at_playhead(&self, path: &Path) -> OpReply {
        self.insert_path(path)
    }

    fn insert_at_playhead(&self, job_id: &str) -> OpReply {
        match self.core.wait_job_output(job_id) {
            Ok(path) => self.insert_path(&path),
            Err(reply) => reply,
        }
    }

    fn import_into_bin(&self, job_id: &str) -> OpReply {
        match self.core.wait_job_output(job_id) {
            Ok(path) => self.import_path(&path, None),
            Err(reply) => reply,
        }
    }

    fn reveal_file(&self, path: &Path) -> OpReply {
        reveal_in_file_manager(path)
    }

    fn diag_in_out(&self) -> DiagReply {
        decode_reply(self.call("diagInOut", &json!({})))
    }

    fn diag(&self) -> DiagReply {
        let mut reply: DiagReply = decode_reply(self.call("diag", &json!({})));
        if reply.host.is_none() {
            reply.host = Some(HostIdentity::Resolve.tag().to_string());
        }
        reply
    }
}
