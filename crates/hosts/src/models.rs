//! Wire-shaped reply types shared by every adapter. All of them carry a
//! boolean `ok`; business failures (host not running, bad selection, export
//! timeout) travel as `ok: false` with an `error` string, never as a thrown
//! error or a non-200 HTTP status.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use platform::MediaKind;

/// A reply type that can be built from a bare error message. Lets generic
/// plumbing turn any failure into the right wire shape.
pub trait FromError {
    fn from_error(msg: impl Into<String>) -> Self;
}

/// Deserialize a normalized script reply into a concrete reply type. The
/// value always has boolean `ok` (see `script::parse_reply`); a shape
/// mismatch beyond that degrades to an error reply instead of panicking.
pub fn decode_reply<T: DeserializeOwned + FromError>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| T::from_error(format!("bad reply shape: {e}")))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpReply {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            error: None,
        }
    }
}

impl FromError for supervisor::StartReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self::failed(msg.into())
    }
}

impl FromError for supervisor::StopReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: None,
            error: Some(msg.into()),
        }
    }
}

impl FromError for OpReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: None,
            error: Some(msg.into()),
        }
    }
}

/// Request for a native file selection dialog. `path` carries a selection
/// already made by the panel's own picker (hosts without a native dialog);
/// the adapter then only validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogRequest {
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DialogRequest {
    pub fn pick(kind: MediaKind) -> Self {
        Self { kind, path: None }
    }

    pub fn validate(kind: MediaKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: Some(path.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DialogResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DialogResult {
    pub fn selected(path: impl Into<String>) -> Self {
        Self {
            ok: true,
            path: Some(path.into()),
            canceled: None,
            error: None,
        }
    }

    /// User dismissed the dialog. Not an error; the UI just does nothing.
    pub fn canceled() -> Self {
        Self {
            ok: true,
            path: None,
            canceled: Some(true),
            error: None,
        }
    }
}

impl FromError for DialogResult {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            path: None,
            canceled: None,
            error: Some(msg.into()),
        }
    }
}

/// Project directory lookup. Older host scripts reply with `path` instead
/// of `outputDir`; both are accepted and `location()` hides the split.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DirReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DirReply {
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            ok: true,
            output_dir: Some(path.into()),
            path: None,
            error: None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.output_dir.as_deref().or(self.path.as_deref())
    }
}

impl FromError for DirReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            output_dir: None,
            path: None,
            error: Some(msg.into()),
        }
    }
}

/// Export outcome. Same `outputPath`/`path` duality as [`DirReply`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExportReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportReply {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            ok: true,
            output_path: Some(path.into()),
            path: None,
            error: None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.output_path.as_deref().or(self.path.as_deref())
    }
}

impl FromError for ExportReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            output_path: None,
            path: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExistsReply {
    pub ok: bool,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExistsReply {
    pub fn of(exists: bool) -> Self {
        Self {
            ok: true,
            exists,
            error: None,
        }
    }
}

impl FromError for ExistsReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            exists: false,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ThumbnailReply {
    pub fn data(url: impl Into<String>) -> Self {
        Self {
            ok: true,
            data_url: Some(url.into()),
            error: None,
        }
    }
}

impl FromError for ThumbnailReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data_url: None,
            error: Some(msg.into()),
        }
    }
}

/// Timeline/host diagnostics. `ok: false` here is still a useful answer
/// (e.g. the host app is simply not running), so every field stays
/// populated as far as the adapter can tell.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiagReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_timeline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_point: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_point: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FromError for DiagReply {
    fn from_error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(msg.into()),
            ..Default::default()
        }
    }
}

/// In/out range video export parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportVideoOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAudioOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Sample rate hint for hosts that honor it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}
