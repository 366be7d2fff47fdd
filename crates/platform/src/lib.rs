//! Filesystem and policy conventions shared by every host integration:
//! the per-user application-support directory tree, the sentinel-gated
//! debug log, and the media selection policy (allowed containers, size cap).

pub mod debug_log;
pub mod media;

pub use debug_log::DebugLog;
pub use media::{MediaKind, MediaPolicy};

use std::path::PathBuf;

/// Port the local job/upload proxy listens on.
pub const JOB_SERVER_PORT: u16 = 3000;
/// Bridge port for the Resolve workflow plugin.
pub const BRIDGE_PORT_RESOLVE: u16 = 45790;
/// Bridge port for the FCPX workflow extension.
pub const BRIDGE_PORT_FCPX: u16 = 45791;

/// Overrides the base application-support directory when set.
pub const BASE_DIR_ENV: &str = "SYNC_EXTENSIONS_DIR";

const BASE_DIR_NAME: &str = "sync. extensions";

/// Base directory for logs, caches, state and uploads.
///
/// Resolves to `AppData/Roaming` on Windows, `Library/Application Support`
/// on macOS and `~/.config` elsewhere, unless `SYNC_EXTENSIONS_DIR` points
/// somewhere else.
pub fn base_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(BASE_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let base = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
    base.join(BASE_DIR_NAME)
}

/// The well-known subdirectories under the base directory.
#[derive(Debug, Clone)]
pub struct AppDirs {
    pub base: PathBuf,
    pub logs: PathBuf,
    pub cache: PathBuf,
    pub state: PathBuf,
    pub uploads: PathBuf,
    pub updates: PathBuf,
}

impl AppDirs {
    pub fn resolve() -> Self {
        Self::from_base(base_dir())
    }

    pub fn from_base(base: PathBuf) -> Self {
        Self {
            logs: base.join("logs"),
            cache: base.join("cache"),
            state: base.join("state"),
            uploads: base.join("uploads"),
            updates: base.join("updates"),
            base,
        }
    }

    /// Create any missing subdirectories. Best effort, returns the first
    /// error so callers can surface a broken install.
    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in [
            &self.base,
            &self.logs,
            &self.cache,
            &self.state,
            &self.uploads,
            &self.updates,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Conventional location of a rendered job output.
    pub fn job_output_path(&self, job_id: &str) -> PathBuf {
        self.uploads.join(format!("{job_id}_output.mp4"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirs_hang_off_base() {
        let dirs = AppDirs::from_base(PathBuf::from("/tmp/syncext"));
        assert_eq!(dirs.logs, PathBuf::from("/tmp/syncext/logs"));
        assert_eq!(dirs.uploads, PathBuf::from("/tmp/syncext/uploads"));
    }

    #[test]
    fn job_output_follows_naming_convention() {
        let dirs = AppDirs::from_base(PathBuf::from("/tmp/syncext"));
        assert_eq!(
            dirs.job_output_path("abc123"),
            PathBuf::from("/tmp/syncext/uploads/abc123_output.mp4")
        );
    }

    #[test]
    fn ensure_creates_the_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = AppDirs::from_base(tmp.path().join("sync. extensions"));
        dirs.ensure().unwrap();
        assert!(dirs.logs.is_dir());
        assert!(dirs.cache.is_dir());
        assert!(dirs.state.is_dir());
        assert!(dirs.uploads.is_dir());
        assert!(dirs.updates.is_dir());
    }
}
