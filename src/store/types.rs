use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted unit of client state.
///
/// Serialized as `{id, type, data, created_at, updated_at}`; anything reading
/// the store directly depends on that exact shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,

    /// Free-form category tag such as "config".
    #[serde(rename = "type", default)]
    pub entry_type: String,

    /// Opaque payload. `null` is a valid stored value.
    #[serde(default)]
    pub data: Value,

    /// Set on first save and never changed afterwards.
    #[serde(default)]
    pub created_at: DateTime<Utc>,

    /// Refreshed on every save.
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// A fresh entry with unset timestamps; the engine stamps them on save.
    pub fn new(id: impl Into<String>, entry_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            entry_type: entry_type.into(),
            data,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_null()
    }
}

/// Whether a timestamp still holds its zero value.
///
/// Covers both the Unix epoch default and the year-1 zero time written by
/// older clients.
pub fn is_unset(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() <= 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_type_key() {
        let entry = Entry::new("forward_url", "config", json!("http://example"));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "config");
        assert_eq!(value["data"], "http://example");
        assert!(value.get("entry_type").is_none());
        assert!(value.get("created_at").is_some());
    }

    #[test]
    fn decodes_record_from_older_client() {
        let raw = r#"{"id":"client_id","type":"config","data":null,
            "created_at":"0001-01-01T00:00:00Z",
            "updated_at":"2024-03-01T08:30:00.123456+08:00"}"#;
        let entry: Entry = serde_json::from_str(raw).unwrap();
        assert!(!entry.has_data());
        assert!(is_unset(&entry.created_at));
        assert!(!is_unset(&entry.updated_at));
    }

    #[test]
    fn new_entry_has_unset_timestamps() {
        let entry = Entry::new("a", "note", json!(1));
        assert!(is_unset(&entry.created_at));
        assert!(is_unset(&entry.updated_at));
    }
}
