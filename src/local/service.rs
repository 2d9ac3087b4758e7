use super::Response;
use crate::identity::{self, CONFIG_ENTRY_TYPE};
use crate::store::{Entry, EntryStore};
use serde_json::Value;
use tracing::{error, info};

/// Key of the stored forward URL.
pub const FORWARD_URL_KEY: &str = "forward_url";

/// Type assigned to generic data saved without one.
pub const DEFAULT_ENTRY_TYPE: &str = "default";

/// Local client data: identity, forward URL and arbitrary keyed blobs.
///
/// Every method returns a [`Response`]; storage faults are logged here and
/// surfaced as a 500 envelope.
#[derive(Debug, Clone)]
pub struct LocalDataService {
    store: EntryStore,
}

impl LocalDataService {
    pub fn new(store: EntryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// The client id, generated and saved on first use or when null.
    pub async fn load_client_id(&self) -> Response {
        match identity::ensure_client_id(&self.store).await {
            Ok(id) => Response::success(id),
            Err(e) => {
                error!("Failed to load client id: {}", e);
                Response::error("failed to generate client id")
            }
        }
    }

    pub async fn save_forward_url(&self, url: &str) -> Response {
        if url.is_empty() {
            return Response::error("forward url must not be empty");
        }

        let entry = Entry::new(FORWARD_URL_KEY, CONFIG_ENTRY_TYPE, Value::from(url));
        match self.store.save(entry).await {
            Ok(_) => {
                info!(url, "Saved forward url");
                Response::success(Value::Null)
            }
            Err(e) => {
                error!("Failed to save forward url: {}", e);
                Response::error("failed to save forward url")
            }
        }
    }

    /// The forward URL, or an empty string when none is stored.
    pub async fn load_forward_url(&self) -> Response {
        match self.store.load(FORWARD_URL_KEY).await {
            Ok(entry) if entry.has_data() => Response::success(entry.data),
            Ok(_) => Response::success(""),
            Err(e) if e.is_not_found() => Response::success(""),
            Err(e) => {
                error!("Failed to load forward url: {}", e);
                Response::error("failed to load forward url")
            }
        }
    }

    /// Data stored under `id`, or `null` when absent.
    pub async fn load_localdata(&self, id: &str) -> Response {
        if id.is_empty() {
            return Response::error("data id must not be empty");
        }

        match self.store.load(id).await {
            Ok(entry) => Response::success(entry.data),
            Err(e) if e.is_not_found() => Response::success(Value::Null),
            Err(e) => {
                error!(id, "Failed to load local data: {}", e);
                Response::error("failed to load local data")
            }
        }
    }

    pub async fn save_localdata(&self, id: &str, entry_type: &str, data: Value) -> Response {
        if id.is_empty() {
            return Response::error("data id must not be empty");
        }
        let entry_type = if entry_type.is_empty() {
            DEFAULT_ENTRY_TYPE
        } else {
            entry_type
        };

        match self.store.save(Entry::new(id, entry_type, data)).await {
            Ok(_) => {
                info!(id, entry_type, "Saved local data");
                Response::success(Value::Null)
            }
            Err(e) => {
                error!(id, "Failed to save local data: {}", e);
                Response::error("failed to save local data")
            }
        }
    }

    pub async fn delete_localdata(&self, id: &str) -> Response {
        if id.is_empty() {
            return Response::error("data id must not be empty");
        }

        match self.store.delete(id).await {
            Ok(()) => {
                info!(id, "Deleted local data");
                Response::success(Value::Null)
            }
            Err(e) => {
                error!(id, "Failed to delete local data: {}", e);
                Response::error("failed to delete local data")
            }
        }
    }

    /// Every stored entry, config records included.
    pub async fn get_localdata_list(&self) -> Response {
        let entries = match self.store.list().await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list local data: {}", e);
                return Response::error("failed to list local data");
            }
        };

        match serde_json::to_value(entries) {
            Ok(data) => Response::success(data),
            Err(e) => {
                error!("Failed to encode local data list: {}", e);
                Response::error("failed to list local data")
            }
        }
    }
}
