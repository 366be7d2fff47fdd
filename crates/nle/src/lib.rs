//! The panel-facing facade. UI code talks to one object with one method
//! set, regardless of whether the current host is reached in-process (CEP,
//! UXP) or through the local bridge server (Resolve, FCPX), and regardless
//! of which editor is hosting the panel.

pub mod client;
pub mod detect;
pub mod facade;
pub mod startup;

pub use client::JobServerClient;
pub use detect::detect_host;
pub use facade::{Nle, Transport};
pub use startup::{start_panel, PanelEvent, StartupOptions};
