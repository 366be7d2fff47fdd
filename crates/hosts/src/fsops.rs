//! Plain filesystem operations exposed through the adapter surface:
//! directory creation, existence checks, and thumbnail shuttling as
//! `data:` URLs (the panel webview cannot read arbitrary disk paths).

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::models::{ExistsReply, FromError, OpReply, ThumbnailReply};

pub fn ensure_dir(path: &Path) -> OpReply {
    match std::fs::create_dir_all(path) {
        Ok(()) => OpReply::ok(),
        Err(e) => OpReply::from_error(format!("ensureDir failed for {}: {e}", path.display())),
    }
}

pub fn file_exists(path: &Path) -> ExistsReply {
    ExistsReply::of(path.exists())
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// Read an image file into a `data:image/...;base64,` URL.
pub fn read_thumbnail(path: &Path) -> ThumbnailReply {
    match std::fs::read(path) {
        Err(e) => ThumbnailReply::from_error(format!(
            "cannot read thumbnail {}: {e}",
            path.display()
        )),
        Ok(bytes) => ThumbnailReply::data(format!(
            "data:{};base64,{}",
            mime_for(path),
            BASE64.encode(bytes)
        )),
    }
}

/// Persist a `data:image/...;base64,` URL to disk, creating parents.
pub fn save_thumbnail(path: &Path, data_url: &str) -> OpReply {
    let Some(payload) = split_data_url(data_url) else {
        return OpReply::from_error("not a base64 image data URL");
    };
    let bytes = match BASE64.decode(payload) {
        Ok(b) => b,
        Err(e) => return OpReply::from_error(format!("bad base64 payload: {e}")),
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return OpReply::from_error(format!("cannot create {}: {e}", parent.display()));
        }
    }
    match std::fs::write(path, bytes) {
        Ok(()) => OpReply::ok(),
        Err(e) => OpReply::from_error(format!("cannot write {}: {e}", path.display())),
    }
}

/// `data:image/<fmt>;base64,<payload>` -> payload. Rejects non-image and
/// non-base64 URLs.
fn split_data_url(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("data:image/")?;
    let (_fmt, rest) = rest.split_once(";base64,")?;
    Some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest well-formed payload we care about; content is irrelevant,
    // the helpers never decode pixels.
    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn thumbnail_round_trips_through_data_url() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("thumb.png");
        std::fs::write(&src, PNG_BYTES).unwrap();

        let read = read_thumbnail(&src);
        assert!(read.ok);
        let url = read.data_url.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let dst = tmp.path().join("nested").join("copy.png");
        assert!(save_thumbnail(&dst, &url).ok);
        assert_eq!(std::fs::read(&dst).unwrap(), PNG_BYTES);
    }

    #[test]
    fn jpeg_extension_gets_jpeg_mime() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("frame.JPG");
        std::fs::write(&src, b"\xff\xd8\xff").unwrap();
        let url = read_thumbnail(&src).data_url.unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn save_rejects_non_image_urls() {
        let tmp = tempfile::tempdir().unwrap();
        let r = save_thumbnail(&tmp.path().join("x.png"), "data:text/plain;base64,aGk=");
        assert!(!r.ok);
        let r = save_thumbnail(&tmp.path().join("x.png"), "data:image/png;base64,@@@");
        assert!(!r.ok);
    }

    #[test]
    fn exists_and_ensure_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");
        assert!(!file_exists(&dir).exists);
        assert!(ensure_dir(&dir).ok);
        assert!(file_exists(&dir).exists);
    }
}
