//! Adapter for Final Cut Pro. FCPX offers no embedded scripting surface at
//! all, so operations go through `osascript` running handlers out of the
//! bundled AppleScript library. Every timeline operation first checks that
//! Final Cut Pro is actually running; AppleScript would otherwise launch it
//! as a side effect.

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
    ExportVideoOpts, OpReply,
};
use crate::HostIdentity;

pub const FCPX_NOT_RUNNING: &str = "Final Cut Pro is not running";

/// Operation name to AppleScript handler. Closed table: an op that is not
/// listed here does not exist for this host.
const HANDLERS: &[(&str, &str)] = &[
    ("getProjectDir", "sync_get_project_dir"),
    ("showFileDialog", "sync_choose_media_file"),
    ("exportInOutVideo", "sync_export_in_out_video"),
    ("exportInOutAudio", "sync_export_in_out_audio"),
    ("importFileToBin", "sync_import_to_event"),
    ("insertFileAtPlayhead", "sync_insert_at_playhead"),
    ("diagInOut", "sync_diag_in_out"),
    ("diag", "sync_diag"),
];

fn handler_for(op: &str) -> Option<&'static str> {
    HANDLERS.iter().find(|(o, _)| *o == op).map(|(_, h)| *h)
}

pub struct FcpxAdapter {
    script_lib: PathBuf,
    core: AdapterCore,
}

impl FcpxAdapter {
    pub fn new(ext_root: PathBuf, core: AdapterCore) -> Self {
        Self {
            script_lib: ext_root.join("scripts").join("fcpx_bridge.applescript"),
            core,
        }
    }

    /// `System Events` check. Conservative: any osascript failure counts
    /// as "not running".
    fn is_fcpx_running(&self) -> bool {
        Command::new("osascript")
            .args([
                "-e",
                "tell application \"System Events\" to (name of processes) contains \"Final Cut Pro\"",
            ])
            .output()
            .map(|o| {
                o.status.success()
                    && String::from_utf8_lossy(&o.stdout).trim() == "true"
            })
            .unwrap_or(false)
    }

    fn call(&self, op: &str, payload: &Value) -> Value {
        let Some(handler) = handler_for(op) else {
            return json!({ "ok": false, "error": format!("unsupported operation: {op}") });
        };
        if !self.is_fcpx_running() {
            self.core.log.line(&format!("{op} refused: host not running"));
            return json!({ "ok": false, "error": FCPX_NOT_RUNNING });
        }

        debug!(op, handler, "osascript call");
        let output = Command::new("osascript")
            .arg(&self.script_lib)
            .arg(handler)
            .arg(payload.to_string())
            .output();

        let output = match output {
            Ok(o) => o,
            Err(e) => return json!({ "ok": false, "error": format!("cannot run osascript: {e}") }),
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return json!({
                "ok": false,
                "error": format!("AppleScript failed: {}", stderr.trim()),
            });
        }

        match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(v) if v.get("ok").map(Value::is_boolean) == Some(true) => v,
            Ok(_) | Err(_) => {
                json!({ "ok": false, "error": "Invalid JSON response from Final Cut Pro bridge" })
            }
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

impl HostAdapter for FcpxAdapter {
    fn identity(&self) -> HostIdentity {
        HostIdentity::Fcpx
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

    fn show_file_dialog(&self, req: &DialogRequest) -> DialogResult {
        let policy = MediaPolicy::for_kind(req.kind);
        if let Some(path) = &req.path {
            return validate_selection(&policy, Path::new(path));
        }
        let result: DialogResult = decode_reply(self.call(
            "showFileDialog",
            &json!({ "kind": req.kind, "extensions": policy.allowed_extensions }),
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
        // Finder reveal does not need FCPX at all.
        reveal_in_file_manager(path)
    }

    fn diag_in_out(&self) -> DiagReply {
        if !self.is_fcpx_running() {
            return DiagReply {
                ok: false,
                host: Some(HostIdentity::Fcpx.tag().to_string()),
                host_running: Some(false),
                has_timeline: Some(false),
                error: Some(FCPX_NOT_RUNNING.to_string()),
                ..Default::default()
            };
        }
        decode_reply(self.call("diagInOut", &json!({})))
    }

    /// Unlike the timeline ops, diag answers even when the host is down:
    /// `ok: false` with `hostRunning: false` is the whole point of asking.
    fn diag(&self) -> DiagReply {
        if !self.is_fcpx_running() {
            return DiagReply {
                ok: false,
                host: Some(HostIdentity::Fcpx.tag().to_string()),
                host_running: Some(false),
                has_timeline: Some(false),
                error: Some(FCPX_NOT_RUNNING.to_string()),
                ..Default::default()
            };
        }
        let mut reply: DiagReply = decode_reply(self.call("diag", &json!({})));
        if reply.host.is_none() {
            reply.host = Some(HostIdentity::Fcpx.tag().to_string());
        }
        reply.host_running = Some(true);
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_wired_operation_has_a_handler() {
        for op in [
            "getProjectDir",
            "showFileDialog",
            "exportInOutVideo",
            "exportInOutAudio",
            "importFileToBin",
            "insertFileAtPlayhead",
            "diagInOut",
            "diag",
        ] {
            assert!(handler_for(op).is_some(), "missing handler for {op}");
        }
    }

    #[test]
    fn unknown_operation_is_refused() {
        assert!(handler_for("formatDisk").is_none());
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn timeline_ops_report_host_not_running_off_macos() {
        // osascript does not exist here, which maps to "not running".
        let tmp = tempfile::tempdir().unwrap();
        let dirs = platform::AppDirs::from_base(tmp.path().to_path_buf());
        dirs.ensure().unwrap();
        let core = AdapterCore {
            supervisor: std::sync::Arc::new(supervisor::BackendSupervisor::new(
                std::sync::Arc::new(PanicLauncher),
                3000,
                std::sync::Arc::new(platform::DebugLog::disabled()),
            )),
            dirs,
            log: std::sync::Arc::new(platform::DebugLog::disabled()),
        };
        let a = FcpxAdapter::new(tmp.path().into(), core);

        let r = a.diag_in_out();
        assert!(!r.ok);
        assert_eq!(r.error.as_deref(), Some(FCPX_NOT_RUNNING));
        assert_eq!(r.has_timeline, Some(false));

        let d = a.diag();
        assert!(!d.ok);
        assert_eq!(d.host_running, Some(false));
        assert_eq!(d.has_timeline, Some(false));
    }

    #[cfg(not(target_os = "macos"))]
    struct PanicLauncher;

    #[cfg(not(target_os = "macos"))]
    impl supervisor::Launcher for PanicLauncher {
        fn launch(&self) -> Result<supervisor::LaunchedBackend, supervisor::LaunchError> {
            panic!("launch must not be called from these tests");
        }
    }
}
