//! # kvsync Engine
//!
//! Conflict handling for key-value datasets synchronized between a remote
//! datastore and a local cache.
//!
//! The sync layer (network, storage, change detection) lives outside this
//! crate. When it finds that the remote and local copies of a key have
//! diverged, it builds a [`ConflictRecord`] and asks for a resolved
//! [`Record`] to write back.
//!
//! ## Design Principles
//!
//! - **No IO**: The engine never touches files, network, or platform APIs
//! - **Immutable**: Conflicts are plain values; resolving never mutates them
//! - **Version-preserving**: Resolved records always carry the remote sync
//!   count, so the follow-up write can be checked against it
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is a key, an optional value (`None` is a deletion), a sync
//! count assigned by the datastore, modification metadata, and a `modified`
//! flag for local changes that still have to be pushed.
//!
//! ### Conflicts
//!
//! A [`ConflictRecord`] pairs the remote and local copies of one key and
//! offers three resolutions:
//! - [`ConflictRecord::resolve_with_remote_record`] - take the remote copy
//! - [`ConflictRecord::resolve_with_local_record`] - keep the local copy
//! - [`ConflictRecord::resolve_with_value`] - write a new value
//!
//! ### Batch Resolution
//!
//! A [`Resolver`] applies one [`ResolutionStrategy`] to a whole batch:
//! - [`ResolutionStrategy::LastWriterWins`] - Newer copy wins (default)
//! - [`ResolutionStrategy::RemoteWins`] - Remote copy always wins
//! - [`ResolutionStrategy::LocalWins`] - Local copy always wins
//!
//! ## Quick Start
//!
//! ```rust
//! use kvsync_engine::{ConflictRecord, Record};
//!
//! let remote = Record::new("theme")
//!     .with_value("dark")
//!     .with_sync_count(5)
//!     .with_last_modified_by("phone");
//! let local = Record::new("theme")
//!     .with_value("light")
//!     .with_sync_count(3)
//!     .with_last_modified_by("laptop")
//!     .with_modified(true);
//!
//! let conflict = ConflictRecord::new(remote, local).unwrap();
//! let resolved = conflict.resolve_with_local_record();
//!
//! assert_eq!(resolved.value.as_deref(), Some("light"));
//! assert_eq!(resolved.sync_count, 5);
//! assert!(resolved.modified);
//! ```
//!
//! ## Logging
//!
//! Events are emitted through [`tracing`]. The crate never installs a
//! subscriber; that is up to the host application.
//!
//! ## FFI
//!
//! The [`ffi`] module provides C-compatible functions for use from other languages
//! (Swift, Kotlin, Dart, etc.). All data is exchanged as JSON strings.

pub mod config;
pub mod conflict;
pub mod error;
pub mod ffi;
pub mod record;
pub mod resolve;

// Re-export main types at crate root
pub use config::ResolverConfig;
pub use conflict::ConflictRecord;
pub use error::Error;
pub use record::Record;
pub use resolve::{
    resolve_batch, ConflictHandler, Resolution, ResolutionStrategy, ResolveOutcome, Resolver,
};

/// Type aliases for clarity
pub type RecordKey = String;
pub type DeviceId = String;
pub type SyncCount = u64;
pub type Timestamp = u64;
