//! Client identifier generation.
//!
//! A client id is a 64-character hex token: the SHA-256 digest of the current
//! Unix time, a v4 UUID and a random integer below one million. The same
//! generator serves store bootstrap and the local data service.

use crate::error::Result;
use crate::store::{Entry, EntryStore};
use rand::Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;

/// Well-known key of the client id entry.
pub const CLIENT_ID_KEY: &str = "client_id";

/// Entry type used for client configuration records.
pub const CONFIG_ENTRY_TYPE: &str = "config";

/// Produce a fresh client id. Collisions are not checked.
pub fn generate_client_id() -> String {
    let seed = format!(
        "{}{}{}",
        chrono::Utc::now().timestamp(),
        uuid::Uuid::new_v4(),
        rand::thread_rng().gen_range(0..1_000_000u32)
    );
    hex::encode(Sha256::digest(seed.as_bytes()))
}

/// Return the stored client id, creating one if it is missing or null.
///
/// Storage faults other than a missing record are returned unchanged.
pub async fn ensure_client_id(store: &EntryStore) -> Result<Value> {
    match store.load(CLIENT_ID_KEY).await {
        Ok(entry) if entry.has_data() => return Ok(entry.data),
        Ok(_) => {}
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    let id = Value::String(generate_client_id());
    store
        .save(Entry::new(CLIENT_ID_KEY, CONFIG_ENTRY_TYPE, id.clone()))
        .await?;
    info!("Generated new client id");
    Ok(id)
}
