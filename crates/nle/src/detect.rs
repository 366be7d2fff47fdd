//! Host identity detection. Checked once at panel startup, in strict
//! precedence order; everything after that dispatches on the result.

use std::path::Path;

use hosts::HostIdentity;
use tracing::debug;

/// Forces the detected host, for development against a host that is not
/// actually present.
pub const FORCE_HOST_ENV: &str = "SYNC_FORCE_HOST";

/// Set for us by the backend launcher and by the bridge server.
pub const HOST_APP_ENV: &str = "HOST_APP";

/// Precedence: explicit override, then the `HOST_APP` tag, then a hint
/// from the extension install path, then Premiere as the default CEP host.
pub fn detect_host(ext_root: Option<&Path>) -> HostIdentity {
    detect_from(
        std::env::var(FORCE_HOST_ENV).ok().as_deref(),
        std::env::var(HOST_APP_ENV).ok().as_deref(),
        ext_root,
    )
}

fn detect_from(
    forced: Option<&str>,
    host_app: Option<&str>,
    ext_root: Option<&Path>,
) -> HostIdentity {
    if let Some(tag) = forced {
        if let Ok(id) = tag.parse() {
            debug!(%id, "host forced by env");
            return id;
        }
    }
    if let Some(tag) = host_app {
        if let Ok(id) = tag.parse() {
            return id;
        }
    }
    if let Some(root) = ext_root {
        if let Some(id) = path_hint(root) {
            return id;
        }
    }
    HostIdentity::Ppro
}

/// Install paths carry the host family in their name (workflow extension
/// bundles, CEP extension folders).
fn path_hint(root: &Path) -> Option<HostIdentity> {
    let lower = root.to_string_lossy().to_ascii_lowercase();
    if lower.contains("resolve") {
        Some(HostIdentity::Resolve)
    } else if lower.contains("fcpx") || lower.contains("final cut") {
        Some(HostIdentity::Fcpx)
    } else if lower.contains("after effects") || lower.contains("aeft") {
        Some(HostIdentity::Aeft)
    } else if lower.contains("uxp") || lower.contains("photoshop") {
        Some(HostIdentity::Uxp)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn forced_env_wins_over_everything() {
        let root = PathBuf::from("/Library/CEP/extensions/sync-resolve");
        let id = detect_from(Some("FCPX"), Some("PPRO"), Some(&root));
        assert_eq!(id, HostIdentity::Fcpx);
    }

    #[test]
    fn invalid_forced_value_falls_through() {
        let id = detect_from(Some("QUICKTIME"), Some("AEFT"), None);
        assert_eq!(id, HostIdentity::Aeft);
    }

    #[test]
    fn host_app_tag_wins_over_path() {
        let root = PathBuf::from("/opt/resolve/ext");
        let id = detect_from(None, Some("FCPX"), Some(&root));
        assert_eq!(id, HostIdentity::Fcpx);
    }

    #[test]
    fn path_hint_identifies_host_families() {
        for (path, expected) in [
            ("/opt/Resolve Workflow/sync", HostIdentity::Resolve),
            ("/Applications/Final Cut Pro Ext/sync", HostIdentity::Fcpx),
            ("/Library/CEP/After Effects/sync", HostIdentity::Aeft),
            ("/plugins/uxp/sync", HostIdentity::Uxp),
        ] {
            assert_eq!(
                detect_from(None, None, Some(Path::new(path))),
                expected,
                "{path}"
            );
        }
    }

    #[test]
    fn default_is_premiere() {
        assert_eq!(detect_from(None, None, None), HostIdentity::Ppro);
        assert_eq!(
            detect_from(None, None, Some(Path::new("/somewhere/generic"))),
            HostIdentity::Ppro
        );
    }
}
