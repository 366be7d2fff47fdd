//! Adapter for the UXP runtime. UXP panels get the backend lifecycle and
//! plain filesystem surface; timeline integration does not exist there, so
//! the timeline-shaped operations answer honestly instead of pretending.

use std::path::Path;

use supervisor::{StartReply, StopReply};

use crate::adapter::{AdapterCore, HostAdapter};
use crate::models::{
    DiagReply, DialogRequest, DialogResult, DirReply, ExportAudioOpts, ExportReply,
    ExportVideoOpts, FromError, OpReply,
};
use crate::HostIdentity;

pub const NOT_IMPLEMENTED: &str = "Not yet implemented";

pub struct UxpAdapter {
    core: AdapterCore,
}

impl UxpAdapter {
    pub fn new(core: AdapterCore) -> Self {
        Self { core }
    }
}

impl HostAdapter for UxpAdapter {
    fn identity(&self) -> HostIdentity {
        HostIdentity::Uxp
    }

    fn start_backend(&self) -> StartReply {
        self.core.start_backend()
    }

    fn stop_backend(&self) -> StopReply {
        self.core.stop_backend()
    }

    fn get_project_dir(&self) -> DirReply {
        self.core.default_output_dir()
    }

    fn show_file_dialog(&self, _req: &DialogRequest) -> DialogResult {
        DialogResult::from_error(NOT_IMPLEMENTED)
    }

    fn export_in_out_video(&self, _opts: &ExportVideoOpts) -> ExportReply {
        ExportReply::from_error(NOT_IMPLEMENTED)
    }

    fn export_in_out_audio(&self, _opts: &ExportAudioOpts) -> ExportReply {
        ExportReply::from_error(NOT_IMPLEMENTED)
    }

    fn import_file_to_bin(&self, _path: &Path, _bin_name: Option<&str>) -> OpReply {
        OpReply::from_error(NOT_IMPLEMENTED)
    }

    fn insert_file_at_playhead(&self, _path: &Path) -> OpReply {
        OpReply::from_error(NOT_IMPLEMENTED)
    }

    fn insert_at_playhead(&self, _job_id: &str) -> OpReply {
        OpReply::from_error(NOT_IMPLEMENTED)
    }

    fn import_into_bin(&self, _job_id: &str) -> OpReply {
        OpReply::from_error(NOT_IMPLEMENTED)
    }

    fn reveal_file(&self, path: &Path) -> OpReply {
        crate::adapter::reveal_in_file_manager(path)
    }

    fn diag_in_out(&self) -> DiagReply {
        DiagReply::from_error(NOT_IMPLEMENTED)
    }

    fn diag(&self) -> DiagReply {
        DiagReply {
            ok: true,
            host: Some(HostIdentity::Uxp.tag().to_string()),
            host_running: Some(true),
            has_timeline: Some(false),
            ..Default::default()
        }
    }
}
