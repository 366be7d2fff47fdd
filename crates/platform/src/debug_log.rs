//! Opt-in file logging for field diagnostics.
//!
//! Users enable it after install by dropping a sentinel file into the logs
//! directory; without the sentinel every call is a silent no-op. There is no
//! rotation, the log only grows while the sentinel exists.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Either spelling enables logging; older installs used `.debug`.
const SENTINELS: [&str; 2] = ["debug.enabled", ".debug"];

pub struct DebugLog {
    path: PathBuf,
    tag: String,
    enabled: bool,
    file: Mutex<()>,
}

impl DebugLog {
    /// Log sink for a host tag (`ppro`, `ae`, `resolve`, `fcpx`, `server`).
    /// Enablement is sampled once at construction, matching panel lifetime.
    pub fn for_host(logs_dir: &Path, tag: &str) -> Self {
        let enabled = SENTINELS.iter().any(|s| logs_dir.join(s).exists());
        Self {
            path: logs_dir.join(format!("sync_{tag}_debug.log")),
            tag: tag.to_string(),
            enabled,
            file: Mutex::new(()),
        }
    }

    /// A sink that never writes, for tests and embedded callers.
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            tag: String::new(),
            enabled: false,
            file: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. Failures are swallowed; diagnostics must
    /// never take the panel down.
    pub fn line(&self, message: &str) {
        if !self.enabled {
            return;
        }
        let _guard = self.file.lock();
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let ts = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
            let _ = writeln!(f, "[{ts}] [{tag}] {message}", tag = self.tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_without_sentinel() {
        let tmp = tempfile::tempdir().unwrap();
        let log = DebugLog::for_host(tmp.path(), "ppro");
        assert!(!log.is_enabled());
        log.line("should not appear");
        assert!(!log.path().exists());
    }

    #[test]
    fn appends_when_sentinel_present() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("debug.enabled"), b"").unwrap();
        let log = DebugLog::for_host(tmp.path(), "resolve");
        assert!(log.is_enabled());
        log.line("first");
        log.line("second");
        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[resolve] first"));
        assert!(lines[1].contains("[resolve] second"));
    }

    #[test]
    fn legacy_dot_debug_sentinel_also_enables() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".debug"), b"").unwrap();
        let log = DebugLog::for_host(tmp.path(), "fcpx");
        assert!(log.is_enabled());
    }
}
