//! Resolution policies for batches of conflicts.
//!
//! A sync round can surface several conflicts at once. They are handed to a
//! [`ConflictHandler`], which either returns one resolved record per conflict
//! or aborts the round. [`Resolver`] is the stock handler: it applies a single
//! [`ResolutionStrategy`] to every conflict.
//!
//! # Last writer wins
//!
//! The default strategy compares `last_modified_date` of both copies. The
//! remote copy wins only if the local one is strictly older; on a tie the
//! local copy is kept and pushed again.

use crate::{config::ResolverConfig, ConflictRecord, Error, Record, RecordKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Policy used to pick a side for each conflict.
///
/// Names are parsed with [`FromStr`] wherever they come from, so JSON and
/// environment configuration accept the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum ResolutionStrategy {
    /// Most recently modified copy wins, ties go to local (default)
    #[default]
    LastWriterWins,
    /// Remote copy always wins
    RemoteWins,
    /// Local copy always wins
    LocalWins,
}

impl ResolutionStrategy {
    /// Pick the resolution for a single conflict.
    pub fn choose(&self, conflict: &ConflictRecord) -> Resolution {
        match self {
            ResolutionStrategy::RemoteWins => Resolution::Remote,
            ResolutionStrategy::LocalWins => Resolution::Local,
            ResolutionStrategy::LastWriterWins => {
                let local = conflict.local_record().last_modified_date;
                let remote = conflict.remote_record().last_modified_date;
                if local < remote {
                    Resolution::Remote
                } else {
                    Resolution::Local
                }
            }
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::LastWriterWins => "last-writer-wins",
            ResolutionStrategy::RemoteWins => "remote-wins",
            ResolutionStrategy::LocalWins => "local-wins",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-writer-wins" => Ok(ResolutionStrategy::LastWriterWins),
            "remote-wins" => Ok(ResolutionStrategy::RemoteWins),
            "local-wins" => Ok(ResolutionStrategy::LocalWins),
            other => Err(Error::InvalidConfig(format!(
                "unknown resolution strategy '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ResolutionStrategy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a single conflict is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// Take the remote copy
    Remote,
    /// Keep the local copy
    Local,
    /// Replace with a new value (`None` deletes)
    Value(Option<String>),
}

/// Receives the conflicts of a sync round.
pub trait ConflictHandler {
    /// Resolve every conflict, returning one record per conflict in the same
    /// order, or `None` to abort the sync round.
    fn on_conflict(&self, conflicts: &[ConflictRecord]) -> Option<Vec<Record>>;
}

/// Outcome of resolving a batch of conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    /// Resolved records, in the order of the input conflicts
    pub resolved: Vec<Record>,
    /// Keys resolved with the remote copy
    pub kept_remote: Vec<RecordKey>,
    /// Keys resolved with the local copy
    pub kept_local: Vec<RecordKey>,
    /// Keys resolved with a caller-supplied value
    #[serde(default)]
    pub merged: Vec<RecordKey>,
}

impl ResolveOutcome {
    /// Records that still have to be pushed to the datastore.
    pub fn pending_push(&self) -> impl Iterator<Item = &Record> {
        self.resolved.iter().filter(|r| r.is_modified())
    }
}

/// Resolves every conflict with one strategy.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    strategy: ResolutionStrategy,
    device_id: Option<String>,
}

impl Resolver {
    /// Create a resolver for a strategy.
    pub fn new(strategy: ResolutionStrategy) -> Self {
        Self {
            strategy,
            device_id: None,
        }
    }

    /// Create a resolver from configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            strategy: config.strategy,
            device_id: config.device_id.clone(),
        }
    }

    /// The strategy in use.
    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Resolve all conflicts.
    pub fn resolve_all(&self, conflicts: &[ConflictRecord]) -> ResolveOutcome {
        let outcome = resolve_batch(conflicts, |conflict| self.strategy.choose(conflict));

        info!(
            device_id = self.device_id.as_deref().unwrap_or("unknown"),
            strategy = %self.strategy,
            total = conflicts.len(),
            kept_remote = outcome.kept_remote.len(),
            kept_local = outcome.kept_local.len(),
            merged = outcome.merged.len(),
            "resolved conflicts"
        );

        outcome
    }
}

/// Resolve each conflict with the resolution picked by `choose`.
///
/// Used by [`Resolver`], and by handlers that pick per conflict, e.g. merging
/// some values and taking the remote copy for the rest.
pub fn resolve_batch(
    conflicts: &[ConflictRecord],
    choose: impl Fn(&ConflictRecord) -> Resolution,
) -> ResolveOutcome {
    let mut outcome = ResolveOutcome {
        resolved: Vec::with_capacity(conflicts.len()),
        ..ResolveOutcome::default()
    };

    for conflict in conflicts {
        let resolution = choose(conflict);
        debug!(key = %conflict.key(), ?resolution, "resolving conflict");

        let key = conflict.key().clone();
        match resolution {
            Resolution::Remote => outcome.kept_remote.push(key),
            Resolution::Local => outcome.kept_local.push(key),
            Resolution::Value(_) => outcome.merged.push(key),
        }
        outcome.resolved.push(conflict.resolve(&resolution));
    }

    outcome
}

impl ConflictHandler for Resolver {
    fn on_conflict(&self, conflicts: &[ConflictRecord]) -> Option<Vec<Record>> {
        Some(self.resolve_all(conflicts).resolved)
    }
}
