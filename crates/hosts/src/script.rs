//! Scripting-bridge plumbing for the CEP hosts: building `evalScript`
//! payloads and normalizing whatever comes back into a `{ok, ...}` object.
//!
//! Host scripts are not trustworthy responders. Depending on host version
//! and script age they return a JSON object, a bare path string, an empty
//! string, or an engine error message. `parse_reply` is the single place
//! that heuristic lives.

use std::path::Path;

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("scripting bridge unavailable")]
    Unavailable,
    #[error("script evaluation failed: {0}")]
    Eval(String),
}

/// Seam between adapters and the host's script engine. The production
/// implementation lives in the panel shell (CSInterface); tests substitute
/// canned responders.
pub trait ScriptBridge: Send + Sync {
    fn eval(&self, source: &str) -> Result<String, ScriptError>;
}

/// Bridge for environments where no script engine is attached (e.g. the
/// standalone control binary). Every call fails fast.
pub struct UnavailableBridge;

impl ScriptBridge for UnavailableBridge {
    fn eval(&self, _source: &str) -> Result<String, ScriptError> {
        Err(ScriptError::Unavailable)
    }
}

/// `fnName("<json>")` with the payload embedded as a JS string literal, the
/// host-side function parses it back. Serializing the serialized payload
/// gives exactly the quoting/escaping a JS literal needs.
pub fn build_call(fn_name: &str, payload: &Value) -> String {
    let arg = payload.to_string();
    let literal = serde_json::to_string(&arg).unwrap_or_else(|_| "\"{}\"".to_string());
    format!("{fn_name}({literal})")
}

/// Like [`build_call`], but guarded: if the function is not defined yet the
/// host script is loaded first. Covers panel reloads where the engine kept
/// state but the script did not.
pub fn build_guarded_call(fn_name: &str, payload: &Value, host_script: &Path) -> String {
    let call = build_call(fn_name, payload);
    let script_path = host_script.to_string_lossy().replace('\\', "/").replace('\'', "\\'");
    format!(
        "(function(){{ if (typeof {fn_name} === 'undefined') {{ $.evalFile('{script_path}'); }} return {call}; }})()"
    )
}

/// Normalize a raw `evalScript` result into an object with a boolean `ok`.
///
/// Rules, in order:
/// 1. valid JSON object that has a boolean `ok` passes through untouched;
/// 2. anything containing a path separator is treated as a success payload
///    from an old-style script that returns the bare path;
/// 3. empty replies become `no response`; everything else is surfaced as
///    the error text verbatim (engine errors like `EvalScript error.`).
pub fn parse_reply(raw: &str) -> Value {
    let trimmed = raw.trim();

    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if v.get("ok").map(Value::is_boolean) == Some(true) {
            return v;
        }
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return json!({ "ok": true, "path": trimmed });
    }

    if trimmed.is_empty() {
        json!({ "ok": false, "error": "no response" })
    } else {
        json!({ "ok": false, "error": trimmed })
    }
}
