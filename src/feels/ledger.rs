//! # Visibility Ledger
//!
//! Every entry is public unless its id is listed in the owner's `nopub` file.
//! The ledger lives apart from the entries so that flipping visibility never
//! touches an entry's content or modification time.
//!
//! The file holds one entry file name (`YYYYMMDD.txt`) per line. Lines that do
//! not name a valid entry are ignored. A ledger that is missing or cannot be
//! read counts as empty: every entry is treated as public, and a warning is
//! logged.
//!
//! The file is created on the first toggle and fully rewritten (atomically) on
//! every change.

use crate::config::FeelsConfig;
use crate::error::Result;
use crate::model::{parse_id, EntryId, Visibility};
use crate::paths::Owner;
use crate::store::StorageBackend;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityLedger {
    path: PathBuf,
    private: BTreeSet<EntryId>,
}

impl VisibilityLedger {
    pub fn load<B: StorageBackend>(backend: &B, owner: &Owner) -> Self {
        let path = owner.ledger_file();
        let private = match backend.read_to_string(&path) {
            Ok(Some(text)) => parse_ledger(&text),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!(owner = %owner.name, "nopub list unreadable, treating all entries as public: {e}");
                BTreeSet::new()
            }
        };
        Self { path, private }
    }

    pub fn is_private(&self, id: &EntryId) -> bool {
        self.private.contains(id)
    }

    pub fn visibility(&self, id: &EntryId) -> Visibility {
        if self.is_private(id) {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn private_ids(&self) -> impl Iterator<Item = &EntryId> {
        self.private.iter()
    }

    /// Set the visibility of `id`, persisting only if it changed.
    pub fn set<B: StorageBackend>(
        &mut self,
        backend: &B,
        id: &EntryId,
        visibility: Visibility,
    ) -> Result<()> {
        let changed = match visibility {
            Visibility::Private => self.private.insert(*id),
            Visibility::Public => self.private.remove(id),
        };
        if changed {
            self.persist(backend)?;
            debug!(%id, %visibility, "visibility changed");
        }
        Ok(())
    }

    /// Flip `id` between public and private and persist. Returns the new state.
    pub fn toggle<B: StorageBackend>(&mut self, backend: &B, id: &EntryId) -> Result<Visibility> {
        let next = match self.visibility(id) {
            Visibility::Public => Visibility::Private,
            Visibility::Private => Visibility::Public,
        };
        self.set(backend, id, next)?;
        Ok(next)
    }

    /// Drop ids whose entries no longer exist. Returns how many were removed.
    pub fn prune<B: StorageBackend>(&mut self, backend: &B, live: &[EntryId]) -> Result<usize> {
        let live: BTreeSet<_> = live.iter().copied().collect();
        let before = self.private.len();
        self.private.retain(|id| live.contains(id));
        let removed = before - self.private.len();
        if removed > 0 {
            self.persist(backend)?;
            info!(removed, "pruned stale nopub ids");
        }
        Ok(removed)
    }

    fn persist<B: StorageBackend>(&self, backend: &B) -> Result<()> {
        backend.atomic_write(&self.path, render_ledger(&self.private).as_bytes())
    }
}

fn parse_ledger(text: &str) -> BTreeSet<EntryId> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let id = parse_id(line);
            if id.is_none() {
                debug!("ignoring nopub line {line:?}");
            }
            id
        })
        .collect()
}

fn render_ledger(private: &BTreeSet<EntryId>) -> String {
    private
        .iter()
        .map(|id| format!("{}\n", id.file_name()))
        .collect()
}

/// Whether `id` is currently private for `owner`.
pub fn is_private<B: StorageBackend>(backend: &B, owner: &Owner, id: &EntryId) -> bool {
    VisibilityLedger::load(backend, owner).is_private(id)
}

/// Flip one entry's visibility in the persisted ledger.
pub fn toggle<B: StorageBackend>(backend: &B, owner: &Owner, id: &EntryId) -> Result<Visibility> {
    VisibilityLedger::load(backend, owner).toggle(backend, id)
}

/// Visibility a freshly created entry starts with.
pub fn default_for_new_post(config: &FeelsConfig) -> Visibility {
    if config.post_as_nopub {
        Visibility::Private
    } else {
        Visibility::Public
    }
}
