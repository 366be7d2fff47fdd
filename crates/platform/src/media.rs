//! Media selection policy: which containers a picker accepts per kind, and
//! the upload size cap. Product decisions, kept as values rather than
//! literals so individual hosts can override them.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Upload cap. Files larger than this are rejected.
pub const MAX_MEDIA_FILE_BYTES: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

#[derive(Debug, Clone)]
pub struct MediaPolicy {
    pub kind: MediaKind,
    pub allowed_extensions: Vec<&'static str>,
    pub max_bytes: u64,
}

impl MediaPolicy {
    pub fn video() -> Self {
        Self {
            kind: MediaKind::Video,
            allowed_extensions: vec!["mp4", "mov"],
            max_bytes: MAX_MEDIA_FILE_BYTES,
        }
    }

    pub fn audio() -> Self {
        Self {
            kind: MediaKind::Audio,
            allowed_extensions: vec!["wav", "mp3"],
            max_bytes: MAX_MEDIA_FILE_BYTES,
        }
    }

    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Video => Self::video(),
            MediaKind::Audio => Self::audio(),
        }
    }

    /// Extension check is case-insensitive; a missing extension never passes.
    pub fn allows_path(&self, path: &Path) -> bool {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_ascii_lowercase(),
            None => return false,
        };
        self.allowed_extensions.iter().any(|a| *a == ext)
    }

    /// At or below the cap passes; only sizes above it are rejected.
    pub fn allows_size(&self, bytes: u64) -> bool {
        bytes <= self.max_bytes
    }
}
