use super::launcher::{ManagedChild, ProcessLauncher, TokioLauncher};
use super::types::SupervisorStatus;
use crate::config::ProcessConfig;
use crate::error::{Error, ProcessError, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Time a freshly spawned process gets before it is checked.
pub const DEFAULT_SETTLE_PERIOD: Duration = Duration::from_millis(500);

/// Owns the caller helper process.
///
/// The handle lives behind one async lock: `start` and `stop` hold it
/// exclusively for their whole run, so only one lifecycle transition is ever
/// in flight. Liveness is reconciled lazily when `is_running` or
/// `health_check` is called; nothing polls in the background.
pub struct ProcessSupervisor {
    config: ProcessConfig,
    launcher: Arc<dyn ProcessLauncher>,
    settle_period: Duration,
    /// `Some` exactly while the status is `Running`, or during a transition.
    child: RwLock<Option<Box<dyn ManagedChild>>>,
    /// Only written while `child` is write-locked.
    status: Mutex<SupervisorStatus>,
}

impl ProcessSupervisor {
    pub fn new(config: ProcessConfig) -> Self {
        Self::with_launcher(config, Arc::new(TokioLauncher))
    }

    pub fn with_launcher(config: ProcessConfig, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            config,
            launcher,
            settle_period: DEFAULT_SETTLE_PERIOD,
            child: RwLock::new(None),
            status: Mutex::new(SupervisorStatus::Stopped),
        }
    }

    pub fn with_settle_period(mut self, settle_period: Duration) -> Self {
        self.settle_period = settle_period;
        self
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Configured port. Not verified against the live process.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn status(&self) -> SupervisorStatus {
        *self.status.lock()
    }

    fn set_status(&self, status: SupervisorStatus) {
        let mut current = self.status.lock();
        if *current != status {
            debug!("Caller process status: {} -> {}", *current, status);
            *current = status;
        }
    }

    pub async fn pid(&self) -> Option<u32> {
        self.child.read().await.as_ref().and_then(|c| c.id())
    }

    /// Launch the helper, retrying up to `start_retry` times.
    ///
    /// Returns immediately when already running. Cancellation is honored
    /// between attempts and yields `Error::Cancelled`.
    #[tracing::instrument(skip(self, cancel), fields(port = self.config.port))]
    pub async fn start(&self, cancel: &CancellationToken) -> Result<()> {
        let mut slot = self.child.write().await;

        if self.status() == SupervisorStatus::Running {
            info!("Caller process already running");
            return Ok(());
        }

        self.set_status(SupervisorStatus::Starting);

        let attempts = self.config.start_retry.max(1);
        let args = self.config.render_args();
        debug!("Caller arguments: {:?}", args);

        let mut last_err = None;
        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                return Err(self.cancelled_start());
            }

            info!("Starting caller process (attempt {}/{})", attempt, attempts);
            match self.launch_and_settle(&args).await {
                Ok(child) => {
                    info!(pid = ?child.id(), "Caller process started on port {}", self.config.port);
                    *slot = Some(child);
                    self.set_status(SupervisorStatus::Running);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Caller process failed to start: {}", e);
                    last_err = Some(e);
                }
            }

            if attempt < attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(self.cancelled_start()),
                    _ = tokio::time::sleep(self.config.retry_delay()) => {}
                }
            }
        }

        self.set_status(SupervisorStatus::Stopped);
        error!("Caller process failed to start after {} attempts", attempts);
        Err(ProcessError::start_failed(last_err).into())
    }

    fn cancelled_start(&self) -> Error {
        warn!("Caller process start cancelled");
        self.set_status(SupervisorStatus::Stopped);
        Error::Cancelled("start".to_string())
    }

    /// Spawn once and confirm the process survives the settle period.
    async fn launch_and_settle(&self, args: &[String]) -> io::Result<Box<dyn ManagedChild>> {
        let mut child = self.launcher.launch(&self.config.exe_path, args).await?;

        tokio::time::sleep(self.settle_period).await;

        if let Err(e) = child.probe() {
            let _ = child.kill();
            return Err(e);
        }
        Ok(child)
    }

    /// Stop the helper, giving up on a graceful exit once `cancel` fires.
    pub async fn stop(&self, cancel: &CancellationToken) -> Result<()> {
        self.stop_until(cancel.cancelled()).await
    }

    /// Stop the helper, giving up on a graceful exit after `timeout`.
    pub async fn stop_within(&self, timeout: Duration) -> Result<()> {
        self.stop_until(tokio::time::sleep(timeout)).await
    }

    #[tracing::instrument(skip_all)]
    async fn stop_until<F>(&self, deadline: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let mut slot = self.child.write().await;

        if self.status() != SupervisorStatus::Running {
            debug!("Caller process not running, nothing to stop");
            return Ok(());
        }

        let Some(mut child) = slot.take() else {
            self.set_status(SupervisorStatus::Stopped);
            return Ok(());
        };

        self.set_status(SupervisorStatus::Stopping);
        info!(pid = ?child.id(), "Stopping caller process");

        if let Err(e) = child.terminate() {
            warn!("Failed to signal caller process: {}", e);
        }

        // The waiter owns the child from here on. Cancelling `escalate`
        // makes it kill the process instead of waiting politely.
        let escalate = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();
        let waiter_escalate = escalate.clone();
        tokio::spawn(async move {
            let exited = tokio::select! {
                biased;
                res = child.wait() => Some(res),
                _ = waiter_escalate.cancelled() => None,
            };
            let res = match exited {
                Some(res) => res,
                None => {
                    if let Err(e) = child.kill() {
                        warn!("Failed to kill caller process: {}", e);
                    }
                    child.wait().await
                }
            };
            let _ = done_tx.send(res);
        });

        tokio::select! {
            res = done_rx => match res {
                Ok(Ok(code)) => info!("Caller process stopped (exit code {:?})", code),
                Ok(Err(e)) => warn!("Error while waiting for caller process: {}", e),
                Err(_) => warn!("Caller process waiter went away"),
            },
            _ = deadline => {
                warn!("Timed out waiting for caller process to exit, killing it");
                escalate.cancel();
            }
        }

        self.set_status(SupervisorStatus::Stopped);
        Ok(())
    }

    /// Whether the helper is believed to be running.
    ///
    /// A stale belief (the process has vanished) is corrected here.
    pub async fn is_running(&self) -> bool {
        {
            let slot = self.child.read().await;
            if self.status() != SupervisorStatus::Running {
                return false;
            }
            if slot.as_ref().is_some_and(|c| c.is_alive()) {
                return true;
            }
        }

        let mut slot = self.child.write().await;
        if self.status() != SupervisorStatus::Running {
            return false;
        }
        if slot.as_ref().is_some_and(|c| c.is_alive()) {
            return true;
        }
        info!("Caller process is gone, marking stopped");
        *slot = None;
        self.set_status(SupervisorStatus::Stopped);
        false
    }

    /// Probe the helper.
    ///
    /// Fails with `PROCESS_STOPPED` when not running, or when the probe finds
    /// the process gone (which also marks it stopped).
    #[tracing::instrument(skip(self))]
    pub async fn health_check(&self) -> Result<()> {
        let probe = {
            let slot = self.child.read().await;
            if self.status() != SupervisorStatus::Running {
                return Err(ProcessError::stopped("caller process is not running", None).into());
            }
            match slot.as_ref() {
                Some(child) => child.probe(),
                None => Err(io::Error::other("no process handle")),
            }
        };

        let Err(cause) = probe else {
            return Ok(());
        };

        // The slot may hold a different child by now; only clear a dead one.
        let mut slot = self.child.write().await;
        if self.status() == SupervisorStatus::Running {
            if let Some(Ok(())) = slot.as_ref().map(|c| c.probe()) {
                debug!("Caller process healthy on re-check");
                return Ok(());
            }
            *slot = None;
            self.set_status(SupervisorStatus::Stopped);
        }
        warn!("Caller process health check failed: {}", cause);
        Err(ProcessError::stopped("caller process has stopped", Some(cause)).into())
    }
}

impl std::fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("exe_path", &self.config.exe_path)
            .field("port", &self.config.port)
            .field("status", &self.status())
            .finish()
    }
}
