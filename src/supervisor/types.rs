use std::fmt;

/// Lifecycle of the supervised caller process.
///
/// `Stopped -> Starting -> Running -> Stopping -> Stopped`. A failed health
/// check moves `Running` straight back to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorStatus {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl SupervisorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupervisorStatus::Stopped => "stopped",
            SupervisorStatus::Starting => "starting",
            SupervisorStatus::Running => "running",
            SupervisorStatus::Stopping => "stopping",
        }
    }
}

impl fmt::Display for SupervisorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
