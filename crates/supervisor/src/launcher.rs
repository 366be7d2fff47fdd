//! Locates the bundled Node runtime inside the extension install and spawns
//! the job server with piped diagnostics.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;

use platform::DebugLog;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LaunchError {
    /// Broken install. Non-retryable; the UI tells the user to reinstall.
    #[error("Node binary or server file missing")]
    MissingFiles { runtime: PathBuf, entry: PathBuf },
    #[error("failed to spawn backend: {0}")]
    Spawn(#[from] std::io::Error),
}

/// `bin/<platform>-<arch>` directory name, using Node's platform naming
/// (the bundled runtimes ship under the names Node distributes them as).
pub fn runtime_dir_name() -> String {
    let platform = match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "aarch64" => "arm64",
        "x86_64" => "x64",
        other => other,
    };
    format!("{platform}-{arch}")
}

#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Extension install root: contains `bin/` and `server/`.
    pub ext_root: PathBuf,
    /// Host tag exported as `HOST_APP`; the server keys per-host behavior
    /// (log file naming, telemetry labels) off it.
    pub host_app: String,
    /// Extra environment entries layered over the inherited environment.
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    pub fn new(ext_root: impl Into<PathBuf>, host_app: impl Into<String>) -> Self {
        Self {
            ext_root: ext_root.into(),
            host_app: host_app.into(),
            env: Vec::new(),
        }
    }

    pub fn runtime_binary(&self) -> PathBuf {
        let bin = if cfg!(windows) { "node.exe" } else { "node" };
        self.ext_root.join("bin").join(runtime_dir_name()).join(bin)
    }

    pub fn server_dir(&self) -> PathBuf {
        self.ext_root.join("server")
    }

    /// TypeScript entry wins when both are present; installs that ship a
    /// prebuilt `server.js` skip the loader entirely.
    pub fn server_entry(&self) -> PathBuf {
        let src = self.server_dir().join("src");
        let ts = src.join("server.ts");
        if ts.exists() {
            ts
        } else {
            src.join("server.js")
        }
    }

    /// The `tsx` loader shim installed under the server's node_modules.
    pub fn loader_shim(&self) -> PathBuf {
        let shim = if cfg!(windows) { "tsx.cmd" } else { "tsx" };
        self.server_dir()
            .join("node_modules")
            .join(".bin")
            .join(shim)
    }
}

/// Handle returned from a launch. `child` is `None` for stub launchers in
/// tests; real launches always carry the process.
#[derive(Debug)]
pub struct LaunchedBackend {
    pub pid: Option<u32>,
    pub child: Option<Child>,
}

pub trait Launcher: Send + Sync {
    fn launch(&self) -> Result<LaunchedBackend, LaunchError>;
}

pub struct ProcessLauncher {
    spec: LaunchSpec,
    log: Arc<DebugLog>,
}

impl ProcessLauncher {
    pub fn new(spec: LaunchSpec, log: Arc<DebugLog>) -> Self {
        Self { spec, log }
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    fn command(&self, runtime: &Path, entry: &Path) -> Command {
        let is_ts = entry.extension().and_then(|e| e.to_str()) == Some("ts");
        let shim = self.spec.loader_shim();

        let mut cmd = if is_ts && shim.exists() {
            let mut c = Command::new(&shim);
            c.arg(entry);
            c
        } else if is_ts {
            let mut c = Command::new(runtime);
            c.args(["-r", "tsx/cjs"]).arg(entry);
            c
        } else {
            let mut c = Command::new(runtime);
            c.arg(entry);
            c
        };

        cmd.current_dir(self.spec.server_dir())
            .env("HOST_APP", &self.spec.host_app)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (k, v) in &self.spec.env {
            cmd.env(k, v);
        }
        cmd
    }

    fn drain(&self, child: &mut Child) {
        use std::io::{BufRead, BufReader};
        if let Some(out) = child.stdout.take() {
            let log = self.log.clone();
            std::thread::spawn(move || {
                for line in BufReader::new(out).lines().map_while(Result::ok) {
                    debug!(target: "backend", "{line}");
                    log.line(&format!("server stdout: {line}"));
                }
            });
        }
        if let Some(err) = child.stderr.take() {
            let log = self.log.clone();
            std::thread::spawn(move || {
                for line in BufReader::new(err).lines().map_while(Result::ok) {
                    debug!(target: "backend", "stderr: {line}");
                    log.line(&format!("server stderr: {line}"));
                }
            });
        }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self) -> Result<LaunchedBackend, LaunchError> {
        let runtime = self.spec.runtime_binary();
        let entry = self.spec.server_entry();

        if !runtime.exists() || !entry.exists() {
            self.log.line(&format!(
                "launch failed, missing files (runtime={} entry={})",
                runtime.display(),
                entry.display()
            ));
            return Err(LaunchError::MissingFiles { runtime, entry });
        }

        let mut child = self.command(&runtime, &entry).spawn()?;
        self.drain(&mut child);
        let pid = child.id();
        self.log.line(&format!(
            "spawned backend pid={pid} entry={}",
            entry.display()
        ));
        Ok(LaunchedBackend {
            pid: Some(pid),
            child: Some(child),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_dir_matches_node_naming() {
        let name = runtime_dir_name();
        assert!(name.contains('-'));
        // Node never calls these by Rust's names.
        assert!(!name.contains("macos"));
        assert!(!name.contains("x86_64"));
        assert!(!name.contains("aarch64"));
    }

    #[test]
    fn missing_install_is_fatal_and_descriptive() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = LaunchSpec::new(tmp.path(), "PPRO");
        let launcher = ProcessLauncher::new(spec, Arc::new(DebugLog::disabled()));
        let err = launcher.launch().unwrap_err();
        assert_eq!(err.to_string(), "Node binary or server file missing");
    }

    #[test]
    fn prefers_typescript_entry_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("server").join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("server.ts"), b"").unwrap();
        std::fs::write(src.join("server.js"), b"").unwrap();
        let spec = LaunchSpec::new(tmp.path(), "FCPX");
        assert_eq!(spec.server_entry(), src.join("server.ts"));
    }

    #[test]
    fn falls_back_to_prebuilt_js_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("server").join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("server.js"), b"").unwrap();
        let spec = LaunchSpec::new(tmp.path(), "RESOLVE");
        assert_eq!(spec.server_entry(), src.join("server.js"));
    }
}
