//! The uniform `nle` surface. One method set, two transports: in-process
//! adapter calls for hosts that embed the panel, HTTP against the local
//! bridge server for hosts that keep the panel in a plain webview.
//!
//! No method returns a transport error. A dead bridge or a bad reply comes
//! back as the same `{ok: false, error}` shape the adapters produce, so UI
//! code has exactly one failure path.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hosts::models::{decode_reply, FromError};
use hosts::{
    DiagReply, DialogRequest, DialogResult, DirReply, ExistsReply, ExportAudioOpts, ExportReply,
    ExportVideoOpts, HostAdapter, HostIdentity, OpReply, ThumbnailReply,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use supervisor::{StartReply, StopReply};
use tracing::debug;

pub enum Transport {
    /// Adapter lives in this process.
    Direct(Arc<dyn HostAdapter>),
    /// Adapter lives behind the local bridge server.
    Bridge { base_url: String, agent: ureq::Agent },
}

pub struct Nle {
    identity: HostIdentity,
    transport: Transport,
}

impl Nle {
    pub fn direct(adapter: Arc<dyn HostAdapter>) -> Self {
        Self {
            identity: adapter.identity(),
            transport: Transport::Direct(adapter),
        }
    }

    /// Reach the bridge server on the host's well-known port.
    pub fn bridge(identity: HostIdentity) -> Option<Self> {
        let port = identity.bridge_port()?;
        Some(Self::bridge_at(identity, format!("http://127.0.0.1:{port}")))
    }

    pub fn bridge_at(identity: HostIdentity, base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(1500))
            .timeout(Duration::from_secs(120))
            .build();
        Self {
            identity,
            transport: Transport::Bridge {
                base_url: base_url.into(),
                agent,
            },
        }
    }

    pub fn identity(&self) -> HostIdentity {
        self.identity
    }

    fn bridge_raw(&self, op: &str, payload: &Value) -> Result<Value, String> {
        let Transport::Bridge { base_url, agent } = &self.transport else {
            unreachable!("bridge_raw is only called on bridge transports");
        };
        let url = format!("{base_url}/nle/{op}");
        debug!(%url, "bridge call");
        let result = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&payload.to_string());
        let resp = match result {
            Ok(resp) => resp,
            // The bridge replies 200 even for business failures; a status
            // error here still carries a JSON body worth reading.
            Err(ureq::Error::Status(_code, resp)) => resp,
            Err(e) => return Err(format!("bridge unreachable: {e}")),
        };
        let body = resp
            .into_string()
            .map_err(|e| format!("bridge reply unreadable: {e}"))?;
        serde_json::from_str(&body).map_err(|e| format!("bridge reply not JSON: {e}"))
    }

    fn over_bridge<T: DeserializeOwned + FromError>(&self, op: &str, payload: Value) -> T {
        match self.bridge_raw(op, &payload) {
            Ok(v) => decode_reply(v),
            Err(e) => T::from_error(e),
        }
    }

    pub fn load_host_script(&self) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.load_host_script(),
            Transport::Bridge { .. } => self.over_bridge("loadHostScript", json!({})),
        }
    }

    pub fn start_backend(&self) -> StartReply {
        match &self.transport {
            Transport::Direct(a) => a.start_backend(),
            Transport::Bridge { .. } => self.over_bridge("startBackend", json!({})),
        }
    }

    pub fn stop_backend(&self) -> StopReply {
        match &self.transport {
            Transport::Direct(a) => a.stop_backend(),
            Transport::Bridge { .. } => self.over_bridge("stopBackend", json!({})),
        }
    }

    pub fn get_project_dir(&self) -> DirReply {
        match &self.transport {
            Transport::Direct(a) => a.get_project_dir(),
            Transport::Bridge { .. } => self.over_bridge("getProjectDir", json!({})),
        }
    }

    pub fn show_file_dialog(&self, req: &DialogRequest) -> DialogResult {
        match &self.transport {
            Transport::Direct(a) => a.show_file_dialog(req),
            Transport::Bridge { .. } => self.over_bridge(
                "showFileDialog",
                serde_json::to_value(req).unwrap_or_else(|_| json!({})),
            ),
        }
    }

    pub fn export_in_out_video(&self, opts: &ExportVideoOpts) -> ExportReply {
        match &self.transport {
            Transport::Direct(a) => a.export_in_out_video(opts),
            Transport::Bridge { .. } => self.over_bridge(
                "exportInOutVideo",
                serde_json::to_value(opts).unwrap_or_else(|_| json!({})),
            ),
        }
    }

    pub fn export_in_out_audio(&self, opts: &ExportAudioOpts) -> ExportReply {
        match &self.transport {
            Transport::Direct(a) => a.export_in_out_audio(opts),
            Transport::Bridge { .. } => self.over_bridge(
                "exportInOutAudio",
                serde_json::to_value(opts).unwrap_or_else(|_| json!({})),
            ),
        }
    }

    pub fn import_file_to_bin(&self, path: &Path, bin_name: Option<&str>) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.import_file_to_bin(path, bin_name),
            Transport::Bridge { .. } => self.over_bridge(
                "importFileToBin",
                json!({ "path": path.to_string_lossy(), "binName": bin_name }),
            ),
        }
    }

    pub fn insert_file_at_playhead(&self, path: &Path) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.insert_file_at_playhead(path),
            Transport::Bridge { .. } => self.over_bridge(
                "insertFileAtPlayhead",
                json!({ "path": path.to_string_lossy() }),
            ),
        }
    }

    pub fn insert_at_playhead(&self, job_id: &str) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.insert_at_playhead(job_id),
            Transport::Bridge { .. } => {
                self.over_bridge("insertAtPlayhead", json!({ "jobId": job_id }))
            }
        }
    }

    pub fn import_into_bin(&self, job_id: &str) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.import_into_bin(job_id),
            Transport::Bridge { .. } => self.over_bridge("importIntoBin", json!({ "jobId": job_id })),
        }
    }

    pub fn reveal_file(&self, path: &Path) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.reveal_file(path),
            Transport::Bridge { .. } => {
                self.over_bridge("revealFile", json!({ "path": path.to_string_lossy() }))
            }
        }
    }

    pub fn ensure_dir(&self, path: &Path) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.ensure_dir(path),
            Transport::Bridge { .. } => {
                self.over_bridge("ensureDir", json!({ "path": path.to_string_lossy() }))
            }
        }
    }

    pub fn file_exists(&self, path: &Path) -> ExistsReply {
        match &self.transport {
            Transport::Direct(a) => a.file_exists(path),
            Transport::Bridge { .. } => {
                self.over_bridge("fileExists", json!({ "path": path.to_string_lossy() }))
            }
        }
    }

    pub fn read_thumbnail(&self, path: &Path) -> ThumbnailReply {
        match &self.transport {
            Transport::Direct(a) => a.read_thumbnail(path),
            Transport::Bridge { .. } => {
                self.over_bridge("readThumbnail", json!({ "path": path.to_string_lossy() }))
            }
        }
    }

    pub fn save_thumbnail(&self, path: &Path, data_url: &str) -> OpReply {
        match &self.transport {
            Transport::Direct(a) => a.save_thumbnail(path, data_url),
            Transport::Bridge { .. } => self.over_bridge(
                "saveThumbnail",
                json!({ "path": path.to_string_lossy(), "dataUrl": data_url }),
            ),
        }
    }

    pub fn diag_in_out(&self) -> DiagReply {
        match &self.transport {
            Transport::Direct(a) => a.diag_in_out(),
            Transport::Bridge { .. } => self.over_bridge("diagInOut", json!({})),
        }
    }

    pub fn diag(&self) -> DiagReply {
        match &self.transport {
            Transport::Direct(a) => a.diag(),
            Transport::Bridge { .. } => self.over_bridge("diag", json!({})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::MediaKind;
    use std::net::TcpListener;

    #[test]
    fn bridge_hosts_resolve_their_ports() {
        assert!(Nle::bridge(HostIdentity::Resolve).is_some());
        assert!(Nle::bridge(HostIdentity::Fcpx).is_some());
        assert!(Nle::bridge(HostIdentity::Ppro).is_none());
    }

    #[test]
    fn dead_bridge_degrades_to_error_replies() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let nle = Nle::bridge_at(HostIdentity::Resolve, format!("http://127.0.0.1:{port}"));

        let r = nle.diag();
        assert!(!r.ok);
        assert!(r.error.unwrap().contains("bridge unreachable"));

        let r = nle.show_file_dialog(&DialogRequest::pick(MediaKind::Video));
        assert!(!r.ok);

        let r = nle.start_backend();
        assert!(!r.ok);
    }
}
