//! Core configuration types.
//!
//! This module contains the root [`Config`] struct and the sections the
//! client core consumes: the caller process, logging, and local storage.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::parse_duration;
use crate::error::Result;

pub const DEFAULT_PORT: u16 = 21999;
pub const DEFAULT_ARGS: &str = "--port=%d";
pub const DEFAULT_START_RETRY: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_STOP_TIMEOUT: &str = "5s";

/// Root configuration structure for the client's app.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub process: ProcessConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// How to launch the caller helper executable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessConfig {
    /// Path to the helper executable.
    pub exe_path: PathBuf,

    /// Port handed to the helper through the argument template.
    pub port: u16,

    /// Argument template. `{port}` and `%d` are replaced with the port, and
    /// the result is split on whitespace into individual arguments.
    pub args: String,

    /// Spawn attempts before giving up (at least 1).
    pub start_retry: u32,

    /// Pause between failed attempts, in milliseconds.
    #[serde(rename = "retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How long shutdown waits for the helper to exit, e.g. "5s" or "500ms".
    pub stop_timeout: String,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            exe_path: default_exe_path(),
            port: DEFAULT_PORT,
            args: DEFAULT_ARGS.to_string(),
            start_retry: DEFAULT_START_RETRY,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            stop_timeout: DEFAULT_STOP_TIMEOUT.to_string(),
        }
    }
}

fn default_exe_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("root/process/caller_local.exe")
    } else {
        PathBuf::from("root/process/caller_local")
    }
}

impl ProcessConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn stop_timeout(&self) -> Result<Duration> {
        parse_duration(&self.stop_timeout)
    }

    /// Expand the argument template for the configured port.
    pub fn render_args(&self) -> Vec<String> {
        let port = self.port.to_string();
        self.args
            .replace("{port}", &port)
            .replace("%d", &port)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Log verbosity accepted in configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "fatal" => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    /// tracing has no fatal level, so it collapses into error.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
    Both,
}

impl LogOutput {
    pub fn to_console(&self) -> bool {
        matches!(self, LogOutput::Stdout | LogOutput::Both)
    }

    pub fn to_file(&self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub output: LogOutput,
    /// Directory receiving rolling log files when output includes `file`.
    pub file_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            output: LogOutput::Stdout,
            file_path: PathBuf::from("root/logs"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Prefix under which the `storage/` directory is created.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("root"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_args_substitutes_printf_placeholder() {
        let process = ProcessConfig::default();
        assert_eq!(process.render_args(), vec!["--port=21999".to_string()]);
    }

    #[test]
    fn render_args_substitutes_braced_placeholder_and_splits() {
        let process = ProcessConfig {
            port: 8080,
            args: "--listen {port} --quiet".to_string(),
            ..Default::default()
        };
        assert_eq!(process.render_args(), vec!["--listen", "8080", "--quiet"]);
    }

    #[test]
    fn empty_template_yields_no_args() {
        let process = ProcessConfig {
            args: "   ".to_string(),
            ..Default::default()
        };
        assert!(process.render_args().is_empty());
    }

    #[test]
    fn fatal_level_maps_to_error_filter() {
        assert_eq!(LogLevel::Fatal.as_filter(), "error");
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}
