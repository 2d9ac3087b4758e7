//! # Caller Shell
//!
//! Core of the desktop call client: supervision of the external caller
//! helper process and a small local entry store for client state.
//!
//! ## Features
//!
//! - **Process Supervision**: start with bounded retries, graceful stop with a
//!   deadline, lazy liveness reconciliation
//! - **Local Entry Store**: SQLite-backed keyed entries behind a process-wide
//!   handle with explicit initialization
//! - **Local Data Service**: client id, forward URL and keyed data, answered
//!   with `{code, message, data}` envelopes
//!
//! ## Quick Start
//!
//! ```no_run
//! use caller_shell::{Parser, Shell};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), caller_shell::Error> {
//! let config = Parser::new().load_config("root/configs/app.yaml")?;
//! let shell = Shell::new(config);
//!
//! let cancel = CancellationToken::new();
//! shell.startup(&cancel).await?;
//!
//! let response = shell.local().load_forward_url().await;
//! println!("forward url: {}", response.data);
//!
//! shell.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod local;
pub mod logging;
pub mod shell;
pub mod store;
pub mod supervisor;

// Re-export commonly used types
pub use config::{Config, Parser};
pub use error::{Error, ProcessError, ProcessErrorCode, Result};
pub use local::{LocalDataService, Response};
pub use shell::Shell;
pub use store::{Entry, EntryStore, SqliteStorage, Storage};
pub use supervisor::{ProcessSupervisor, SupervisorStatus};
