//! Cross-host behavior: every identity dispatches to an adapter that
//! honors the same contract.

use std::path::Path;
use std::sync::Arc;

use hosts::{adapter_for, AdapterDeps, DialogRequest, HostIdentity};
use platform::{AppDirs, DebugLog, MediaKind};
use supervisor::{BackendSupervisor, LaunchError, LaunchedBackend, Launcher};

struct PanicLauncher;
impl Launcher for PanicLauncher {
    fn launch(&self) -> Result<LaunchedBackend, LaunchError> {
        panic!("launch must not be called from these tests");
    }
}

fn deps(base: &Path) -> AdapterDeps {
    let dirs = AppDirs::from_base(base.to_path_buf());
    dirs.ensure().unwrap();
    AdapterDeps {
        supervisor: Arc::new(BackendSupervisor::new(
            Arc::new(PanicLauncher),
            3000,
            Arc::new(DebugLog::disabled()),
        )),
        dirs,
        ext_root: base.join("ext"),
        log: Arc::new(DebugLog::disabled()),
        script_bridge: None,
    }
}

#[test]
fn every_identity_dispatches_to_its_own_adapter() {
    let tmp = tempfile::tempdir().unwrap();
    for identity in HostIdentity::ALL {
        let adapter = adapter_for(identity, deps(tmp.path()));
        assert_eq!(adapter.identity(), identity);
    }
}

#[test]
fn filesystem_surface_is_uniform_across_hosts() {
    let tmp = tempfile::tempdir().unwrap();
    for identity in HostIdentity::ALL {
        let adapter = adapter_for(identity, deps(tmp.path()));
        let dir = tmp.path().join(identity.log_tag()).join("nested");
        assert!(adapter.ensure_dir(&dir).ok, "{identity}");
        assert!(adapter.file_exists(&dir).exists, "{identity}");
        assert!(!adapter.file_exists(&dir.join("missing.png")).exists);
    }
}

#[test]
fn selection_validation_is_uniform_where_dialogs_validate() {
    // A preselected wrong-type file must be rejected the same way on every
    // host that validates selections (UXP has no dialog surface at all).
    let tmp = tempfile::tempdir().unwrap();
    let picked = tmp.path().join("clip.mov");
    std::fs::write(&picked, b"data").unwrap();

    for identity in [
        HostIdentity::Aeft,
        HostIdentity::Ppro,
        HostIdentity::Resolve,
        HostIdentity::Fcpx,
    ] {
        let adapter = adapter_for(identity, deps(tmp.path()));
        let r = adapter.show_file_dialog(&DialogRequest::validate(
            MediaKind::Audio,
            picked.to_string_lossy(),
        ));
        assert!(!r.ok, "{identity}");
        assert_eq!(r.error.as_deref(), Some("Invalid file type"), "{identity}");
    }
}

#[test]
fn cep_without_a_script_engine_fails_closed() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter_for(HostIdentity::Ppro, deps(tmp.path()));
    let r = adapter.diag_in_out();
    assert!(!r.ok);
    assert!(r.error.unwrap().contains("scripting bridge unavailable"));
}

#[test]
fn missing_job_output_is_the_same_error_everywhere() {
    let tmp = tempfile::tempdir().unwrap();
    for identity in [HostIdentity::Ppro, HostIdentity::Resolve, HostIdentity::Fcpx] {
        let adapter = adapter_for(identity, deps(tmp.path()));
        let r = adapter.import_into_bin("nope-404");
        assert!(!r.ok, "{identity}");
        assert!(
            r.error.unwrap().contains("File may not be downloaded yet"),
            "{identity}"
        );
    }
}
