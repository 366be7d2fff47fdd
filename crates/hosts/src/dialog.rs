//! Selection validation shared by every host's file dialog path. The
//! dialogs themselves differ wildly per host; what gets accepted does not.

use std::path::Path;

use platform::MediaPolicy;

use crate::models::{DialogResult, FromError};

/// Validate a picked file against the media policy: extension first, then
/// on-disk size. Missing files fail size validation with their own message
/// so the UI can tell "wrong type" from "gone".
pub fn validate_selection(policy: &MediaPolicy, path: &Path) -> DialogResult {
    if !policy.allows_path(path) {
        return DialogResult::from_error("Invalid file type");
    }

    match std::fs::metadata(path) {
        Err(_) => DialogResult::from_error(format!("File not accessible: {}", path.display())),
        Ok(meta) if !policy.allows_size(meta.len()) => DialogResult::from_error(format!(
            "File too large (max {} GB)",
            policy.max_bytes / (1024 * 1024 * 1024)
        )),
        Ok(_) => DialogResult::selected(path.to_string_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::MediaKind;
    use std::io::Write;

    fn touch(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let p = dir.join(name);
        let mut f = std::fs::File::create(&p).unwrap();
        f.write_all(bytes).unwrap();
        p
    }

    #[test]
    fn audio_policy_rejects_video_container() {
        let tmp = tempfile::tempdir().unwrap();
        let p = touch(tmp.path(), "clip.mov", b"data");
        let r = validate_selection(&MediaPolicy::for_kind(MediaKind::Audio), &p);
        assert!(!r.ok);
        assert_eq!(r.error.as_deref(), Some("Invalid file type"));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        let p = touch(tmp.path(), "CLIP.MOV", b"data");
        let r = validate_selection(&MediaPolicy::for_kind(MediaKind::Video), &p);
        assert!(r.ok, "{:?}", r.error);
        assert!(r.path.unwrap().ends_with("CLIP.MOV"));
    }

    #[test]
    fn missing_file_is_not_an_invalid_type() {
        let tmp = tempfile::tempdir().unwrap();
        let r = validate_selection(
            &MediaPolicy::for_kind(MediaKind::Video),
            &tmp.path().join("gone.mp4"),
        );
        assert!(!r.ok);
        assert!(r.error.unwrap().starts_with("File not accessible"));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let p = touch(tmp.path(), "song.wav", b"tiny!");
        let mut policy = MediaPolicy::for_kind(MediaKind::Audio);
        policy.max_bytes = 4; // on-disk size is one byte over
        let r = validate_selection(&policy, &p);
        assert!(!r.ok);
        assert!(r.error.unwrap().starts_with("File too large"));
    }

    #[test]
    fn file_exactly_at_the_cap_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let p = touch(tmp.path(), "song.wav", b"tiny");
        let mut policy = MediaPolicy::for_kind(MediaKind::Audio);
        policy.max_bytes = 4;
        let r = validate_selection(&policy, &p);
        assert!(r.ok, "{:?}", r.error);
    }
}
