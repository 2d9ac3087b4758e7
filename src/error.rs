// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(caller::config::validation),
        help("Run `caller-shell check-config` for the resolved configuration")
    )]
    Validation(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(
        code(caller::database::error),
        help("See recovery suggestions based on the specific error type")
    )]
    Database(#[from] tokio_rusqlite::Error),

    #[error("Entry not found: {0}")]
    #[diagnostic(code(caller::store::not_found))]
    NotFound(String),

    #[error("Entry '{id}' could not be decoded: {reason}")]
    #[diagnostic(code(caller::store::decode))]
    Decode { id: String, reason: String },

    #[error("Entry store is not initialized")]
    #[diagnostic(
        code(caller::store::uninitialized),
        help("Call EntryStore::initialize once at startup before using the store")
    )]
    StoreNotInitialized,

    #[error("Entry store is closed")]
    #[diagnostic(code(caller::store::closed))]
    StoreClosed,

    #[error("Entry store at '{0}' is locked by another instance")]
    #[diagnostic(
        code(caller::store::locked),
        help("Only one client may open a storage directory at a time")
    )]
    StoreLocked(String),

    #[error(transparent)]
    #[diagnostic(
        code(caller::process::error),
        help("Check that the caller executable exists and is executable")
    )]
    Process(#[from] ProcessError),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::Config(_) | Error::Validation(_) | Error::Parse(_) => Some(
                "Check the configuration file with: caller-shell check-config".to_string(),
            ),
            Error::StoreNotInitialized => Some(
                "The entry store must be initialized before local data can be read or written."
                    .to_string(),
            ),
            Error::StoreLocked(path) => Some(format!(
                "Another client instance holds {}. Close it, or remove a stale lock file if no client is running.",
                path
            )),
            Error::Process(e) if e.code == ProcessErrorCode::ProcessStartFailed => Some(
                "Verify process.exe_path in the configuration, or override it with CALLER_EXE_PATH."
                    .to_string(),
            ),
            Error::Database(e) => {
                // tokio_rusqlite wraps the underlying rusqlite error opaquely,
                // so the message text is all we can match on.
                let err_str = e.to_string();
                if err_str.contains("database is locked") || err_str.contains("SQLITE_BUSY") {
                    Some("Another client instance may be writing to the store.".to_string())
                } else if err_str.contains("database disk image is malformed")
                    || err_str.contains("SQLITE_CORRUPT")
                {
                    Some(
                        "The store is corrupted. Back up and remove the storage directory to start fresh."
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }

    /// True for the "no record under this key" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Classification of supervisor failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessErrorCode {
    /// Spawn or confirmation failed after exhausting every attempt.
    ProcessStartFailed,
    /// A liveness check found the process gone.
    ProcessStopped,
    /// Reserved for explicit health-probe callers.
    HealthCheckFailed,
}

impl ProcessErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessErrorCode::ProcessStartFailed => "PROCESS_START_FAILED",
            ProcessErrorCode::ProcessStopped => "PROCESS_STOPPED",
            ProcessErrorCode::HealthCheckFailed => "HEALTH_CHECK_FAILED",
        }
    }
}

impl fmt::Display for ProcessErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supervisor failure with its cause and the moment it was observed.
#[derive(Error, Debug)]
#[error("[{code}] {message}{}", .source.as_ref().map(|e| format!(": {}", e)).unwrap_or_default())]
pub struct ProcessError {
    pub code: ProcessErrorCode,
    pub message: String,
    #[source]
    pub source: Option<io::Error>,
    pub at: DateTime<Utc>,
}

impl ProcessError {
    pub fn new(code: ProcessErrorCode, message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self {
            code,
            message: message.into(),
            source,
            at: Utc::now(),
        }
    }

    pub fn start_failed(source: Option<io::Error>) -> Self {
        Self::new(
            ProcessErrorCode::ProcessStartFailed,
            "failed to start caller process",
            source,
        )
    }

    pub fn stopped(message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self::new(ProcessErrorCode::ProcessStopped, message, source)
    }
}

impl Error {
    /// The supervisor error code, if this is a process error.
    pub fn process_code(&self) -> Option<ProcessErrorCode> {
        match self {
            Error::Process(e) => Some(e.code),
            _ => None,
        }
    }
}

/// Validates and converts a u32 PID to nix::unistd::Pid safely.
/// Returns Err for PID 0 (process group), PID 1 (init), or values > i32::MAX.
#[cfg(unix)]
pub fn validate_pid(pid: u32) -> std::result::Result<nix::unistd::Pid, io::Error> {
    if pid == 0 || pid == 1 || pid > i32::MAX as u32 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to signal PID {}", pid),
        ));
    }
    Ok(nix::unistd::Pid::from_raw(pid as i32))
}

/// Same as validate_pid but allows PID 1 for read-only existence checks.
#[cfg(unix)]
pub fn validate_pid_for_check(pid: u32) -> Option<nix::unistd::Pid> {
    if pid == 0 || pid > i32::MAX as u32 {
        return None;
    }
    Some(nix::unistd::Pid::from_raw(pid as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_error_display_includes_code_and_cause() {
        let err = ProcessError::start_failed(Some(io::Error::new(
            io::ErrorKind::NotFound,
            "no such file",
        )));
        assert_eq!(
            err.to_string(),
            "[PROCESS_START_FAILED] failed to start caller process: no such file"
        );
    }

    #[test]
    fn process_error_display_without_cause() {
        let err = ProcessError::stopped("caller process is not running", None);
        assert_eq!(err.to_string(), "[PROCESS_STOPPED] caller process is not running");
    }

    #[test]
    fn process_code_is_exposed_through_crate_error() {
        let err: Error = ProcessError::stopped("gone", None).into();
        assert_eq!(err.process_code(), Some(ProcessErrorCode::ProcessStopped));
        assert_eq!(Error::StoreClosed.process_code(), None);
    }

    #[test]
    fn not_found_is_recognised() {
        assert!(Error::NotFound("client_id".into()).is_not_found());
        assert!(!Error::StoreClosed.is_not_found());
    }

    #[test]
    fn suggestion_for_locked_store_mentions_path() {
        let err = Error::StoreLocked("/tmp/x/storage".into());
        assert!(err.with_suggestion().contains("/tmp/x/storage"));
    }

    #[cfg(unix)]
    #[test]
    fn validate_pid_rejects_special_pids() {
        assert!(validate_pid(0).is_err());
        assert!(validate_pid(1).is_err());
        assert!(validate_pid(u32::MAX).is_err());
        assert!(validate_pid(4242).is_ok());
        assert!(validate_pid_for_check(1).is_some());
        assert!(validate_pid_for_check(0).is_none());
    }
}
