//! Supervision of the external caller helper process.
//!
//! - `types` - [`SupervisorStatus`]
//! - `launcher` - spawning seam and the tokio-backed launcher
//! - `process` - [`ProcessSupervisor`] start/stop/health logic

mod launcher;
mod process;
mod types;

pub use launcher::{ManagedChild, ProcessLauncher, TokioLauncher};
pub use process::{ProcessSupervisor, DEFAULT_SETTLE_PERIOD};
pub use types::SupervisorStatus;
