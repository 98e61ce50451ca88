//! Conflicts between the remote and local copies of a record.
//!
//! A [`ConflictRecord`] is produced by the synchronization layer when the
//! remote and local copies of the same key have diverged. It is immutable:
//! every resolution builds a fresh [`Record`] ready to be written back.
//!
//! # Resolution
//!
//! | Method | value | sync count | dates and author | modified |
//! |---|---|---|---|---|
//! | [`ConflictRecord::resolve_with_remote_record`] | remote | remote | remote | `false` |
//! | [`ConflictRecord::resolve_with_local_record`] | local | remote | local | `true` |
//! | [`ConflictRecord::resolve_with_value`] | given | remote | local | `true` |
//!
//! The sync count is always taken from the remote copy. A record resolved
//! towards the local side must be pushed again, and the remote sync count is
//! the version that write is conditioned on.

use crate::{error::Result, resolve::Resolution, Error, Record, RecordKey};
use serde::Serialize;
use tracing::{debug, warn};

/// A remote and a local copy of the same record that disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    key: RecordKey,
    remote_record: Record,
    local_record: Record,
}

impl ConflictRecord {
    /// Pair the remote and local copies of a record.
    ///
    /// Fails with [`Error::InvalidArgument`] if the two copies have different keys.
    pub fn new(remote_record: Record, local_record: Record) -> Result<Self> {
        if remote_record.key != local_record.key {
            warn!(
                remote_key = %remote_record.key,
                local_key = %local_record.key,
                "rejecting conflict with mismatched keys"
            );
            return Err(Error::InvalidArgument(
                "the keys of remote record and local record don't match".into(),
            ));
        }

        debug!(
            key = %remote_record.key,
            remote_sync_count = remote_record.sync_count,
            local_sync_count = local_record.sync_count,
            "conflict created"
        );

        Ok(Self {
            key: remote_record.key.clone(),
            remote_record,
            local_record,
        })
    }

    /// Pair two copies where either side may be missing.
    ///
    /// Fails with [`Error::InvalidArgument`] if either copy is `None` or the keys differ.
    pub fn from_optional(
        remote_record: Option<Record>,
        local_record: Option<Record>,
    ) -> Result<Self> {
        match (remote_record, local_record) {
            (Some(remote), Some(local)) => Self::new(remote, local),
            (remote, local) => {
                warn!(
                    remote_present = remote.is_some(),
                    local_present = local.is_some(),
                    "rejecting conflict with absent record"
                );
                Err(Error::InvalidArgument("record can't be absent".into()))
            }
        }
    }

    /// Key of the record in conflict.
    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    /// Copy from remote storage.
    pub fn remote_record(&self) -> &Record {
        &self.remote_record
    }

    /// Copy from local storage.
    pub fn local_record(&self) -> &Record {
        &self.local_record
    }

    /// Resolve by taking the remote copy as-is.
    ///
    /// The result is already in sync with the datastore, so it is not flagged
    /// as modified.
    pub fn resolve_with_remote_record(&self) -> Record {
        let remote = &self.remote_record;
        Record {
            key: self.key.clone(),
            value: remote.value.clone(),
            sync_count: remote.sync_count,
            last_modified_date: remote.last_modified_date,
            last_modified_by: remote.last_modified_by.clone(),
            device_last_modified_date: remote.device_last_modified_date,
            modified: false,
        }
    }

    /// Resolve by keeping the local copy, to be pushed over the remote one.
    pub fn resolve_with_local_record(&self) -> Record {
        self.resolve_over_remote(self.local_record.value.clone())
    }

    /// Resolve with a caller-supplied value, to be pushed over the remote one.
    ///
    /// `None` resolves the conflict to a deletion.
    pub fn resolve_with_value(&self, new_value: Option<String>) -> Record {
        self.resolve_over_remote(new_value)
    }

    /// Resolve according to an explicit [`Resolution`].
    pub fn resolve(&self, resolution: &Resolution) -> Record {
        match resolution {
            Resolution::Remote => self.resolve_with_remote_record(),
            Resolution::Local => self.resolve_with_local_record(),
            Resolution::Value(value) => self.resolve_with_value(value.clone()),
        }
    }

    fn resolve_over_remote(&self, value: Option<String>) -> Record {
        let local = &self.local_record;
        Record {
            key: self.key.clone(),
            value,
            sync_count: self.remote_record.sync_count,
            last_modified_date: local.last_modified_date,
            last_modified_by: local.last_modified_by.clone(),
            device_last_modified_date: local.device_last_modified_date,
            modified: true,
        }
    }
}
