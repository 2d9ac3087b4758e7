use super::{Entry, SqliteStorage, Storage};
use crate::error::{Error, Result};
use crate::identity;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Name of the engine directory created under the configured prefix.
pub const STORAGE_DIR_NAME: &str = "storage";

static INSTANCE: OnceCell<EntryStore> = OnceCell::const_new();

/// Shared handle to the one open entry engine.
///
/// Cloning is cheap. A handle without an engine behind it (see
/// [`EntryStore::instance`] before initialization) answers every call with
/// [`Error::StoreNotInitialized`].
#[derive(Clone, Default)]
pub struct EntryStore {
    inner: Option<Arc<dyn Storage>>,
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("initialized", &self.is_initialized())
            .field("path", &self.path())
            .finish()
    }
}

impl EntryStore {
    /// Open the engine at `<prefix>/storage` and install it process-wide.
    ///
    /// The first successful call wins; later calls return the existing
    /// handle without opening anything, whatever prefix they pass. A failed
    /// open leaves the store uninitialized so the call can be retried.
    pub async fn initialize(prefix: impl AsRef<Path>) -> Result<EntryStore> {
        let dir = prefix.as_ref().join(STORAGE_DIR_NAME);

        let store = INSTANCE
            .get_or_try_init(|| async {
                let storage = SqliteStorage::open(&dir).await?;
                let store = EntryStore::from_storage(Arc::new(storage));
                store.bootstrap().await;
                info!("Entry store initialized at {:?}", dir);
                Ok::<_, Error>(store)
            })
            .await?;

        if store.path() != Some(dir.as_path()) {
            warn!(
                "Entry store already initialized at {:?}; ignoring request for {:?}",
                store.path(),
                dir
            );
        }

        Ok(store.clone())
    }

    /// The process-wide handle, or an unbacked one before initialization.
    pub fn instance() -> EntryStore {
        INSTANCE.get().cloned().unwrap_or_default()
    }

    /// A handle over an explicit engine, independent of the global.
    pub fn from_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Some(storage),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    /// Storage directory, when backed by an on-disk engine.
    pub fn path(&self) -> Option<&Path> {
        self.inner.as_deref().and_then(|s| s.location())
    }

    fn engine(&self) -> Result<&dyn Storage> {
        self.inner.as_deref().ok_or(Error::StoreNotInitialized)
    }

    pub async fn save(&self, entry: Entry) -> Result<Entry> {
        self.engine()?.save(entry).await
    }

    pub async fn load(&self, id: &str) -> Result<Entry> {
        self.engine()?.load(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.engine()?.delete(id).await
    }

    pub async fn list(&self) -> Result<Vec<Entry>> {
        self.engine()?.list().await
    }

    pub async fn close(&self) -> Result<()> {
        self.engine()?.close().await
    }

    /// Make sure a client id exists. Failure is logged; the store stays usable.
    async fn bootstrap(&self) {
        match identity::ensure_client_id(self).await {
            Ok(id) => debug!("Client id: {}", id),
            Err(e) => warn!("Failed to bootstrap client id: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unbacked_handle_reports_not_initialized() {
        let store = EntryStore::default();
        assert!(!store.is_initialized());
        assert!(store.path().is_none());

        assert!(matches!(
            store.load("client_id").await,
            Err(Error::StoreNotInitialized)
        ));
        assert!(matches!(
            store.save(Entry::new("a", "t", json!(1))).await,
            Err(Error::StoreNotInitialized)
        ));
        assert!(matches!(store.list().await, Err(Error::StoreNotInitialized)));
        assert!(matches!(store.close().await, Err(Error::StoreNotInitialized)));
    }

    #[tokio::test]
    async fn injected_handle_delegates_to_engine() {
        let storage = SqliteStorage::new_ephemeral().await.unwrap();
        let store = EntryStore::from_storage(Arc::new(storage));
        let other = store.clone();

        store.save(Entry::new("a", "note", json!("hi"))).await.unwrap();
        assert_eq!(other.load("a").await.unwrap().data, json!("hi"));
        assert!(other.path().is_none());
    }
}
