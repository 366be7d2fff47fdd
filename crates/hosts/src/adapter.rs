//! The adapter contract plus the shared machinery every host reuses:
//! backend supervision, job output resolution, and the dispatch table
//! that turns a [`HostIdentity`] into a concrete adapter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use platform::{AppDirs, DebugLog};
use supervisor::{BackendSupervisor, PollOptions, StartReply, StopReply};

use crate::cep::CepAdapter;
use crate::fcpx::FcpxAdapter;
use crate::models::{
    DiagReply, DialogRequest, DialogResult, DirReply, ExistsReply, ExportAudioOpts, ExportReply,
    ExportVideoOpts, FromError, OpReply, ThumbnailReply,
};
use crate::resolve::ResolveAdapter;
use crate::script::{ScriptBridge, UnavailableBridge};
use crate::uxp::UxpAdapter;
use crate::HostIdentity;

/// One capability set per host. Methods never panic and never return a
/// transport-level error; every outcome is a reply value with `ok`.
pub trait HostAdapter: Send + Sync {
    fn identity(&self) -> HostIdentity;

    /// Load the host-side scripting file. A no-op for hosts that have no
    /// script to load; CEP hosts use it to warm the engine eagerly instead
    /// of on the first call.
    fn load_host_script(&self) -> OpReply {
        OpReply::ok()
    }

    fn start_backend(&self) -> StartReply;
    fn stop_backend(&self) -> StopReply;

    fn get_project_dir(&self) -> DirReply;
    fn show_file_dialog(&self, req: &DialogRequest) -> DialogResult;

    fn export_in_out_video(&self, opts: &ExportVideoOpts) -> ExportReply;
    fn export_in_out_audio(&self, opts: &ExportAudioOpts) -> ExportReply;

    fn import_file_to_bin(&self, path: &Path, bin_name: Option<&str>) -> OpReply;
    fn insert_file_at_playhead(&self, path: &Path) -> OpReply;

    /// Job-id flavored variants: resolve the downloaded output for `job_id`
    /// under the uploads dir, wait for it to finish writing, then hand the
    /// concrete file to the path-based operation.
    fn insert_at_playhead(&self, job_id: &str) -> OpReply;
    fn import_into_bin(&self, job_id: &str) -> OpReply;

    fn reveal_file(&self, path: &Path) -> OpReply;

    fn ensure_dir(&self, path: &Path) -> OpReply {
        crate::fsops::ensure_dir(path)
    }

    fn file_exists(&self, path: &Path) -> ExistsReply {
        crate::fsops::file_exists(path)
    }

    fn read_thumbnail(&self, path: &Path) -> ThumbnailReply {
        crate::fsops::read_thumbnail(path)
    }

    fn save_thumbnail(&self, path: &Path, data_url: &str) -> OpReply {
        crate::fsops::save_thumbnail(path, data_url)
    }

    /// Timeline in/out diagnostics.
    fn diag_in_out(&self) -> DiagReply;

    /// General host/project diagnostics.
    fn diag(&self) -> DiagReply;
}

/// State shared by all adapters regardless of transport.
pub struct AdapterCore {
    pub supervisor: Arc<BackendSupervisor>,
    pub dirs: AppDirs,
    pub log: Arc<DebugLog>,
}

impl AdapterCore {
    pub fn start_backend(&self) -> StartReply {
        self.supervisor.ensure_running()
    }

    pub fn stop_backend(&self) -> StopReply {
        self.supervisor.stop()
    }

    /// Resolve `<uploads>/<job_id>_output.mp4` and wait until the download
    /// stops growing. Errors come back as ready-to-send replies.
    pub fn wait_job_output(&self, job_id: &str) -> Result<PathBuf, OpReply> {
        let path = self.dirs.job_output_path(job_id);
        if !path.exists() {
            return Err(OpReply::from_error(format!(
                "Output file not found: {}. File may not be downloaded yet.",
                path.display()
            )));
        }
        match supervisor::wait_for_stable_file(&path, PollOptions::stability_wait()) {
            Ok(_size) => Ok(path),
            Err(e) => Err(OpReply::from_error(e.to_string())),
        }
    }

    /// Fallback output directory for hosts that cannot report a project
    /// location: `<Documents>/sync. outputs`, created on demand.
    pub fn default_output_dir(&self) -> DirReply {
        let dir = dirs::document_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("sync. outputs");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => DirReply::dir(dir.to_string_lossy()),
            Err(e) => DirReply::from_error(format!("cannot create {}: {e}", dir.display())),
        }
    }
}

/// An export reply is only final once the file really exists; hosts queue
/// renders and reply before the encoder finishes.
pub fn await_export(reply: ExportReply) -> ExportReply {
    if !reply.ok {
        return reply;
    }
    let Some(location) = reply.location().map(PathBuf::from) else {
        return ExportReply::from_error("export reported success without a path");
    };
    match supervisor::wait_for_file(&location, PollOptions::export_wait()) {
        Ok(()) => reply,
        Err(e) => ExportReply::from_error(e.to_string()),
    }
}

/// Reveal a file in the OS file manager. Shared by the hosts whose scripts
/// cannot do it themselves.
pub fn reveal_in_file_manager(path: &Path) -> OpReply {
    let result = if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg("-R").arg(path).status()
    } else if cfg!(windows) {
        std::process::Command::new("explorer")
            .arg(format!("/select,{}", path.display()))
            .status()
    } else {
        // Linux file managers have no portable "select" verb; open the
        // containing directory instead.
        let parent = path.parent().unwrap_or(path);
        std::process::Command::new("xdg-open").arg(parent).status()
    };
    match result {
        Ok(status) if status.success() => OpReply::ok(),
        Ok(status) => OpReply::from_error(format!("file manager exited with {status}")),
        Err(e) => OpReply::from_error(format!("cannot reveal {}: {e}", path.display())),
    }
}

/// Everything a concrete adapter may need. `script_bridge` only matters for
/// the CEP hosts; headless contexts leave it `None` and those calls fail
/// with `scripting bridge unavailable`.
pub struct AdapterDeps {
    pub supervisor: Arc<BackendSupervisor>,
    pub dirs: AppDirs,
    pub ext_root: PathBuf,
    pub log: Arc<DebugLog>,
    pub script_bridge: Option<Arc<dyn ScriptBridge>>,
}

impl AdapterDeps {
    fn core(&self) -> AdapterCore {
        AdapterCore {
            supervisor: self.supervisor.clone(),
            dirs: self.dirs.clone(),
            log: self.log.clone(),
        }
    }
}

/// The one place identity turns into behavior.
pub fn adapter_for(identity: HostIdentity, deps: AdapterDeps) -> Box<dyn HostAdapter> {
    match identity {
        HostIdentity::Aeft | HostIdentity::Ppro => {
            let bridge = deps
                .script_bridge
                .clone()
                .unwrap_or_else(|| Arc::new(UnavailableBridge));
            Box::new(CepAdapter::new(identity, deps.ext_root.clone(), bridge, deps.core()))
        }
        HostIdentity::Resolve => Box::new(ResolveAdapter::new(deps.ext_root.clone(), deps.core())),
        HostIdentity::Fcpx => Box::new(FcpxAdapter::new(deps.ext_root.clone(), deps.core())),
        HostIdentity::Uxp => Box::new(UxpAdapter::new(deps.core())),
    }
}
