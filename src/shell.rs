//! Composition root.
//!
//! Wires the resolved configuration into the process supervisor and the
//! entry store, and runs the startup and shutdown sequences the desktop
//! shell drives. The two subsystems share nothing; only this type knows
//! about both.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::local::LocalDataService;
use crate::store::EntryStore;
use crate::supervisor::ProcessSupervisor;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub struct Shell {
    config: Config,
    supervisor: Arc<ProcessSupervisor>,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        let supervisor = Arc::new(ProcessSupervisor::new(config.process.clone()));
        Self { config, supervisor }
    }

    /// Build a shell around an existing supervisor, e.g. one with a custom
    /// launcher.
    pub fn with_supervisor(config: Config, supervisor: Arc<ProcessSupervisor>) -> Self {
        Self { config, supervisor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn supervisor(&self) -> &Arc<ProcessSupervisor> {
        &self.supervisor
    }

    /// Initialize the process-wide store under `storage.path`.
    pub async fn open_store(&self) -> Result<LocalDataService> {
        let store = EntryStore::initialize(&self.config.storage.path).await?;
        Ok(LocalDataService::new(store))
    }

    /// Local data service over the process-wide store.
    ///
    /// Before [`open_store`](Self::open_store) every call answers with an
    /// error envelope.
    pub fn local(&self) -> LocalDataService {
        LocalDataService::new(EntryStore::instance())
    }

    /// Open the store, then bring up the caller process.
    ///
    /// Only a store failure is returned. A caller process that will not
    /// start is logged and the client carries on without it.
    pub async fn startup(&self, cancel: &CancellationToken) -> Result<()> {
        info!("Client starting");

        let local = self.open_store().await?;
        let client_id = local.load_client_id().await;
        info!("Client id: {}", client_id.data);

        match self.supervisor.start(cancel).await {
            Ok(()) => info!("Caller process running on port {}", self.caller_port()),
            Err(Error::Cancelled(op)) => warn!("Caller process {} cancelled", op),
            Err(e) => error!("Failed to start caller process: {}", e),
        }
        Ok(())
    }

    /// Stop the caller process within `stop_timeout`, then close the store.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Client shutting down");

        let timeout = self.config.process.stop_timeout()?;
        if let Err(e) = self.supervisor.stop_within(timeout).await {
            error!("Failed to stop caller process: {}", e);
        }

        let store = EntryStore::instance();
        if store.is_initialized() {
            store.close().await?;
        }
        Ok(())
    }

    pub fn caller_port(&self) -> u16 {
        self.supervisor.port()
    }

    pub async fn is_caller_running(&self) -> bool {
        self.supervisor.is_running().await
    }
}
