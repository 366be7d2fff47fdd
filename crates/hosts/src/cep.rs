//! Adapter for the CEP hosts (Premiere Pro and After Effects). Every
//! timeline operation is a host-script function call over the scripting
//! bridge; the function names are the host tag prefix plus the operation
//! (`PPRO_exportInOutVideo`, `AEFT_diag`, ...).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

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
use crate::script::{build_guarded_call, parse_reply, ScriptBridge};
use crate::HostIdentity;

pub struct CepAdapter {
    identity: HostIdentity,
    ext_root: PathBuf,
    bridge: Arc<dyn ScriptBridge>,
    host_loaded: AtomicBool,
    core: AdapterCore,
}

impl CepAdapter {
    /// `identity` must be one of the CEP hosts.
    pub fn new(
        identity: HostIdentity,
        ext_root: PathBuf,
        bridge: Arc<dyn ScriptBridge>,
        core: AdapterCore,
    ) -> Self {
        debug_assert!(identity.script_prefix().is_some());
        Self {
            identity,
            ext_root,
            bridge,
            host_loaded: AtomicBool::new(false),
            core,
        }
    }

    fn host_script(&self) -> PathBuf {
        let file = match self.identity {
            HostIdentity::Aeft => "ae.jsx",
            _ => "ppro.jsx",
        };
        self.ext_root.join("host").join(file)
    }

    fn fn_name(&self, op: &str) -> String {
        let prefix = self.identity.script_prefix().unwrap_or("PPRO");
        format!("{prefix}_{op}")
    }

    fn eval_host_script(&self) -> Result<(), crate::script::ScriptError> {
        let script = self.host_script();
        let path = script.to_string_lossy().replace('\\', "/").replace('\'', "\\'");
        self.bridge.eval(&format!("$.evalFile('{path}')")).map(|_| ())
    }

    /// Load the host script once per adapter. Failures are not fatal here;
    /// the guarded call re-loads on demand and surfaces the real error.
    fn ensure_host_loaded(&self) {
        if self.host_loaded.swap(true, Ordering::SeqCst) {
            return;
        }
        match self.eval_host_script() {
            Ok(()) => self.core.log.line("host script loaded"),
            Err(e) => self.core.log.line(&format!("host script load failed: {e}")),
        }
    }

    /// Call a host-script function and normalize whatever comes back.
    fn call(&self, op: &str, payload: &Value) -> Value {
        self.ensure_host_loaded();
        let code = build_guarded_call(&self.fn_name(op), payload, &self.host_script());
        debug!(host = self.identity.tag(), op, "evalScript");
        match self.bridge.eval(&code) {
            Ok(raw) => parse_reply(&raw),
            Err(e) => json!({ "ok": false, "error": e.to_string() }),
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

impl HostAdapter for CepAdapter {
    fn identity(&self) -> HostIdentity {
        self.identity
    }

    fn load_host_script(&self) -> OpReply {
        match self.eval_host_script() {
            Ok(()) => {
                self.host_loaded.store(true, Ordering::SeqCst);
                OpReply::ok()
            }
            Err(e) => OpReply::from_error(e.to_string()),
        }
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
            // Unsaved project or script too old to answer; fall back to the
            // shared output location rather than failing the caller.
            self.core.default_output_dir()
        }
    }

    fn show_file_dialog(&self, req: &DialogRequest) -> DialogResult {
        let policy = MediaPolicy::for_kind(req.kind);

        // A preselected path skips the native dialog entirely.
        if let Some(path) = &req.path {
            return validate_selection(&policy, Path::new(path));
        }

        let result: DialogResult = decode_reply(self.call(
            "showFileDialog",
            &json!({
                "kind": req.kind,
                "extensions": policy.allowed_extensions,
            }),
        ));
        match (&result.path, result.ok) {
            (Some(path), true) => validate_selection(&policy, Path::new(path)),
            _ => result,
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
        // The script engine has no file manager access; do it host-side.
        reveal_in_file_manager(path)
    }

    fn diag_in_out(&self) -> DiagReply {
        decode_reply(self.call("diagInOut", &json!({})))
    }

    fn diag(&self) -> DiagReply {
        let mut reply: DiagReply = decode_reply(self.call("diag", &json!({})));
        if reply.host.is_none() {
            reply.host = Some(self.identity.tag().to_string());
        }
        reply
    }
}
