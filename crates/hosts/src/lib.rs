//! Host adapters: one uniform capability set over four very different
//! editor runtimes (Premiere/After Effects over the CEP scripting bridge,
//! Resolve over a per-call scripting subprocess, Final Cut Pro over
//! AppleScript, and the UXP runtime). Callers dispatch on [`HostIdentity`]
//! exactly once, at adapter construction.

pub mod adapter;
pub mod cep;
pub mod dialog;
pub mod fcpx;
pub mod fsops;
pub mod models;
pub mod resolve;
pub mod script;
pub mod uxp;

pub use adapter::{adapter_for, AdapterCore, AdapterDeps, HostAdapter};
pub use models::{
    DiagReply, DialogRequest, DialogResult, DirReply, ExistsReply, ExportAudioOpts, ExportReply,
    ExportVideoOpts, OpReply, ThumbnailReply,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported host applications. Determined once per
/// session; everything downstream consumes the adapter interface, never the
/// tag (except the dispatch table itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostIdentity {
    #[serde(rename = "AEFT")]
    Aeft,
    #[serde(rename = "PPRO")]
    Ppro,
    #[serde(rename = "RESOLVE")]
    Resolve,
    #[serde(rename = "FCPX")]
    Fcpx,
    #[serde(rename = "UXP")]
    Uxp,
}

impl HostIdentity {
    pub const ALL: [HostIdentity; 5] = [
        Self::Aeft,
        Self::Ppro,
        Self::Resolve,
        Self::Fcpx,
        Self::Uxp,
    ];

    /// Wire tag, also the `HOST_APP` value handed to the job server.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Aeft => "AEFT",
            Self::Ppro => "PPRO",
            Self::Resolve => "RESOLVE",
            Self::Fcpx => "FCPX",
            Self::Uxp => "UXP",
        }
    }

    /// Debug log file tag (`sync_<tag>_debug.log`).
    pub fn log_tag(&self) -> &'static str {
        match self {
            Self::Aeft => "ae",
            Self::Ppro => "ppro",
            Self::Resolve => "resolve",
            Self::Fcpx => "fcpx",
            Self::Uxp => "uxp",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Aeft => "After Effects",
            Self::Ppro => "Premiere Pro",
            Self::Resolve => "DaVinci Resolve",
            Self::Fcpx => "Final Cut Pro",
            Self::Uxp => "Photoshop",
        }
    }

    /// Local bridge port for hosts whose UI reaches the adapter over HTTP.
    /// One port per host family so Resolve and FCPX can run side by side.
    pub fn bridge_port(&self) -> Option<u16> {
        match self {
            Self::Resolve => Some(platform::BRIDGE_PORT_RESOLVE),
            Self::Fcpx => Some(platform::BRIDGE_PORT_FCPX),
            Self::Aeft | Self::Ppro | Self::Uxp => None,
        }
    }

    /// Function name prefix used by the CEP host scripts.
    pub fn script_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Aeft => Some("AEFT"),
            Self::Ppro => Some("PPRO"),
            _ => None,
        }
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for HostIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AEFT" | "AE" => Ok(Self::Aeft),
            "PPRO" | "PREMIERE" => Ok(Self::Ppro),
            "RESOLVE" => Ok(Self::Resolve),
            "FCPX" => Ok(Self::Fcpx),
            "UXP" | "PHXS" => Ok(Self::Uxp),
            other => Err(format!("unknown host identity: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for id in HostIdentity::ALL {
            assert_eq!(id.tag().parse::<HostIdentity>().unwrap(), id);
        }
    }

    #[test]
    fn only_http_hosts_have_bridge_ports() {
        assert_eq!(HostIdentity::Resolve.bridge_port(), Some(45790));
        assert_eq!(HostIdentity::Fcpx.bridge_port(), Some(45791));
        assert_eq!(HostIdentity::Ppro.bridge_port(), None);
        assert_eq!(HostIdentity::Aeft.bridge_port(), None);
    }

    #[test]
    fn serde_uses_wire_tags() {
        let v = serde_json::to_value(HostIdentity::Aeft).unwrap();
        assert_eq!(v, serde_json::json!("AEFT"));
    }
}
