//! # Neighbors
//!
//! Everyone on the host who keeps feels, most recently active first, with
//! the address of their pages when they publish. Only public entries count:
//! a neighbor's nopub entries are neither counted nor listed.
//!
//! Each neighbor's settings are read straight from their settings file.
//! Environment overrides belong to whoever runs feels and never apply to
//! someone else.

use crate::config::FeelsConfig;
use crate::error::Result;
use crate::ledger::VisibilityLedger;
use crate::model::{EntrySummary, Visibility};
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub name: String,
    pub entry_count: usize,
    /// Newest modification time among the public entries.
    pub last_modified: Option<DateTime<Utc>>,
    pub publish_url: Option<String>,
}

/// One [`Neighbor`] per owner, newest activity first.
///
/// Owners who never posted come last, by name. Owners whose entries cannot be
/// listed are skipped with a warning.
pub fn survey<B: StorageBackend>(store: &EntryStore<B>, owners: &[Owner]) -> Vec<Neighbor> {
    let mut neighbors = Vec::new();
    for owner in owners {
        match public_summaries(store, owner) {
            Ok(summaries) => neighbors.push(Neighbor {
                name: owner.name.clone(),
                entry_count: summaries.len(),
                last_modified: summaries.iter().map(|s| s.modified_at).max(),
                publish_url: publish_url(store.backend(), owner),
            }),
            Err(e) => warn!(owner = %owner.name, "skipping neighbor: {e}"),
        }
    }

    neighbors.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.name.cmp(&b.name))
    });
    neighbors
}

/// Public entries of `owner`, newest first.
pub fn public_summaries<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
) -> Result<Vec<EntrySummary>> {
    let ledger = VisibilityLedger::load(store.backend(), owner);
    let mut summaries: Vec<EntrySummary> = store
        .list_entries(owner)?
        .iter()
        .filter(|e| !ledger.is_private(&e.id))
        .map(|e| EntrySummary::new(e, Visibility::Public))
        .collect();
    summaries.sort_by(|a, b| b.id.cmp(&a.id));
    debug!(owner = %owner.name, count = summaries.len(), "public entries");
    Ok(summaries)
}

fn publish_url<B: StorageBackend>(backend: &B, owner: &Owner) -> Option<String> {
    match FeelsConfig::read_for(backend, owner) {
        Ok(config) if config.publishing && config.publish_dir.is_some() => {
            Some(config.publish_url(owner))
        }
        Ok(_) => None,
        Err(e) => {
            warn!(owner = %owner.name, "unreadable settings: {e}");
            None
        }
    }
}
