//! Record types for storing dataset entries.

use crate::{DeviceId, RecordKey, SyncCount, Timestamp};
use serde::{Deserialize, Serialize};

/// A single key-value entry of a dataset.
///
/// The same key exists as a remote copy (as last seen on the datastore) and a
/// local copy (as held in the cache). A `value` of `None` is a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Key of the entry, unique within its dataset
    pub key: RecordKey,
    /// Stored value; `None` when the entry has been deleted
    #[serde(default)]
    pub value: Option<String>,
    /// Version counter assigned by the remote datastore
    #[serde(default)]
    pub sync_count: SyncCount,
    /// When the entry was last modified (milliseconds since epoch)
    #[serde(default)]
    pub last_modified_date: Timestamp,
    /// Identity of the device or client that last modified the entry
    #[serde(default)]
    pub last_modified_by: DeviceId,
    /// Modification time as recorded by the originating device
    #[serde(default)]
    pub device_last_modified_date: Timestamp,
    /// Whether the entry carries local changes not yet pushed
    #[serde(default)]
    pub modified: bool,
}

impl Record {
    /// Create an empty, unsynced record for a key.
    pub fn new(key: impl Into<RecordKey>) -> Self {
        Self {
            key: key.into(),
            value: None,
            sync_count: 0,
            last_modified_date: 0,
            last_modified_by: DeviceId::new(),
            device_last_modified_date: 0,
            modified: false,
        }
    }

    /// Set the value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the value, where `None` marks a deletion.
    pub fn with_optional_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    /// Set the sync count.
    pub fn with_sync_count(mut self, sync_count: SyncCount) -> Self {
        self.sync_count = sync_count;
        self
    }

    /// Set the last modification date.
    pub fn with_last_modified_date(mut self, timestamp: Timestamp) -> Self {
        self.last_modified_date = timestamp;
        self
    }

    /// Set the last modifier.
    pub fn with_last_modified_by(mut self, device_id: impl Into<DeviceId>) -> Self {
        self.last_modified_by = device_id.into();
        self
    }

    /// Set the device-local modification date.
    pub fn with_device_last_modified_date(mut self, timestamp: Timestamp) -> Self {
        self.device_last_modified_date = timestamp;
        self
    }

    /// Set the modified flag.
    pub fn with_modified(mut self, modified: bool) -> Self {
        self.modified = modified;
        self
    }

    /// Check if the record represents a deletion.
    pub fn is_deleted(&self) -> bool {
        self.value.is_none()
    }

    /// Check if the record has local changes that still need to be pushed.
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_defaults() {
        let record = Record::new("color");

        assert_eq!(record.key, "color");
        assert_eq!(record.value, None);
        assert_eq!(record.sync_count, 0);
        assert_eq!(record.last_modified_by, "");
        assert!(record.is_deleted());
        assert!(!record.is_modified());
    }

    #[test]
    fn chained_setters() {
        let record = Record::new("color")
            .with_value("blue")
            .with_sync_count(4)
            .with_last_modified_date(2000)
            .with_last_modified_by("phone-1")
            .with_device_last_modified_date(1990)
            .with_modified(true);

        assert_eq!(record.value.as_deref(), Some("blue"));
        assert_eq!(record.sync_count, 4);
        assert_eq!(record.last_modified_date, 2000);
        assert_eq!(record.last_modified_by, "phone-1");
        assert_eq!(record.device_last_modified_date, 1990);
        assert!(record.is_modified());
        assert!(!record.is_deleted());
    }

    #[test]
    fn optional_value_clears() {
        let record = Record::new("color")
            .with_value("blue")
            .with_optional_value(None);
        assert!(record.is_deleted());
    }

    #[test]
    fn serialization_format() {
        let record = Record::new("color")
            .with_value("blue")
            .with_sync_count(2)
            .with_last_modified_by("phone-1");
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("syncCount")); // camelCase
        assert!(json.contains("lastModifiedBy"));
        assert!(json.contains("deviceLastModifiedDate"));
    }

    #[test]
    fn deserialize_with_missing_fields() {
        let record: Record = serde_json::from_str(r#"{"key": "color", "value": null}"#).unwrap();
        assert_eq!(record, Record::new("color"));
    }
}
