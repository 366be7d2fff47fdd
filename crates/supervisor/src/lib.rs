//! Lifecycle management for the bundled job server: liveness probing,
//! locating and spawning the bundled runtime, and a single-flight supervisor
//! that every host adapter delegates `startBackend` to.

pub mod backend;
pub mod files;
pub mod health;
pub mod launcher;
pub mod poll;

pub use backend::{BackendSupervisor, StartReply, StopReply};
pub use files::{wait_for_file, wait_for_stable_file, WaitError};
pub use health::{check_health, health_url};
pub use launcher::{LaunchError, LaunchSpec, Launcher, LaunchedBackend, ProcessLauncher};
pub use poll::{poll_until, PollOptions};
