//! Bounded waits on files produced by asynchronous host exports and job
//! downloads. Hosts return before their render/download finishes, so the
//! only completion signal is the file itself.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::poll::{poll_until, PollOptions};

#[derive(Debug, Error)]
pub enum WaitError {
    /// The file never showed up. The host operation may still be running.
    #[error("timed out waiting for {path} to appear; the export may still be running")]
    Missing { path: PathBuf },
    /// The file exists but its size kept changing within the budget.
    #[error("{path} is still being written or not accessible")]
    Unstable { path: PathBuf },
}

/// Wait for `path` to exist with a non-zero size.
pub fn wait_for_file(path: &Path, opts: PollOptions) -> Result<(), WaitError> {
    let ok = poll_until(opts, || {
        fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
    });
    if ok {
        Ok(())
    } else {
        Err(WaitError::Missing {
            path: path.to_path_buf(),
        })
    }
}

/// Wait until the file's size is non-zero and unchanged across two
/// consecutive samples one interval apart. Guards against handing a
/// partially written download to the host.
pub fn wait_for_stable_file(path: &Path, opts: PollOptions) -> Result<u64, WaitError> {
    let mut last_size: Option<u64> = None;
    let mut stable_size: Option<u64> = None;
    let mut ever_seen = false;

    poll_until(opts, || {
        let size = match fs::metadata(path) {
            Ok(m) => m.len(),
            Err(_) => {
                last_size = None;
                return false;
            }
        };
        ever_seen = true;
        if size > 0 && last_size == Some(size) {
            stable_size = Some(size);
            return true;
        }
        last_size = Some(size);
        false
    });

    match stable_size {
        Some(size) => Ok(size),
        None if !ever_seen => Err(WaitError::Missing {
            path: path.to_path_buf(),
        }),
        None => Err(WaitError::Unstable {
            path: path.to_path_buf(),
        }),
    }
}
