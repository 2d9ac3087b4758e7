//! Local entry store.
//!
//! - `types` - the persisted [`Entry`] record
//! - `sqlite` - the on-disk engine
//! - `facade` - the process-wide [`EntryStore`] handle

mod facade;
mod sqlite;
mod types;

pub use facade::EntryStore;
pub use sqlite::SqliteStorage;
pub use types::{is_unset, Entry};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Keyed, durable entry storage.
///
/// Implementations serialize their own writes; callers may share one engine
/// across tasks without extra locking.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `entry` under its id, replacing any previous record.
    ///
    /// Stamps `updated_at`, and `created_at` when the record is new. Returns
    /// the entry as stored.
    async fn save(&self, entry: Entry) -> Result<Entry>;

    /// Fails with `NotFound` for a missing id and `Decode` for a record that
    /// no longer deserializes.
    async fn load(&self, id: &str) -> Result<Entry>;

    /// Removing a missing id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Every decodable entry, ordered by id.
    async fn list(&self) -> Result<Vec<Entry>>;

    /// Release the engine. Safe to call more than once.
    async fn close(&self) -> Result<()>;

    /// Directory backing the engine, if any.
    fn location(&self) -> Option<&Path>;
}
