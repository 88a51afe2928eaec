use super::backend::StorageBackend;
use crate::error::{FeelsError, Result};
use crate::model::{parse_id, Entry, EntryId};
use crate::paths::Owner;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Outcome of [`EntryStore::append_or_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Created,
    Appended,
}

pub struct EntryStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

impl<B: StorageBackend> EntryStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All valid entries of `owner`, in no particular order.
    ///
    /// Names that are not `YYYYMMDD.txt` are skipped, as are entries that
    /// cannot be read. A missing entries directory lists as empty.
    pub fn list_entries(&self, owner: &Owner) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for id in self.list_ids(owner)? {
            match self.read_entry(owner, id) {
                Ok(Some(entry)) => entries.push(entry),
                // Removed between listing and reading.
                Ok(None) => {}
                Err(e) => warn!(owner = %owner.name, %id, "skipping unreadable entry: {e}"),
            }
        }
        Ok(entries)
    }

    /// Ids present in the entries directory, without reading bodies.
    pub fn list_ids(&self, owner: &Owner) -> Result<Vec<EntryId>> {
        let names = self.backend.list_files(&owner.entries_dir())?;
        Ok(names
            .iter()
            .filter_map(|name| {
                let id = parse_id(name);
                if id.is_none() {
                    debug!(owner = %owner.name, "ignoring {name}");
                }
                id
            })
            .collect())
    }

    pub fn exists(&self, owner: &Owner, id: &EntryId) -> bool {
        self.backend.exists(&owner.entry_path(id))
    }

    pub fn get_entry(&self, owner: &Owner, id: &EntryId) -> Result<Entry> {
        self.read_entry(owner, *id)?
            .ok_or(FeelsError::EntryNotFound(*id))
    }

    /// Path of the backing file, for handing to an editor or pager.
    pub fn entry_path(&self, owner: &Owner, id: &EntryId) -> PathBuf {
        owner.entry_path(id)
    }

    fn read_entry(&self, owner: &Owner, id: EntryId) -> Result<Option<Entry>> {
        let path = owner.entry_path(&id);
        let Some(body) = self.backend.read_to_string(&path)? else {
            return Ok(None);
        };
        let now = Utc::now();
        let stat = self.backend.stat(&path)?;
        Ok(Some(Entry {
            id,
            owner: owner.name.clone(),
            body,
            created_at: stat.map(|s| s.created).unwrap_or(now),
            modified_at: stat.map(|s| s.modified).unwrap_or(now),
        }))
    }

    /// Append `text` to the entry for `id`, separated by a blank line, or
    /// create the entry if it does not exist yet.
    pub fn append_or_create(&mut self, owner: &Owner, id: &EntryId, text: &str) -> Result<PostOutcome> {
        let path = owner.entry_path(id);
        let (content, outcome) = match self.backend.read_to_string(&path)? {
            Some(existing) => (join_paragraphs(&existing, text), PostOutcome::Appended),
            None => (text.to_string(), PostOutcome::Created),
        };

        self.backend.atomic_write(&path, content.as_bytes())?;
        debug!(owner = %owner.name, %id, ?outcome, "entry written");
        Ok(outcome)
    }

    /// Permanently remove an entry. There is no way back.
    pub fn delete(&mut self, owner: &Owner, id: &EntryId) -> Result<()> {
        if !self.exists(owner, id) {
            return Err(FeelsError::EntryNotFound(*id));
        }
        self.backend.remove_file(&owner.entry_path(id))?;
        info!(owner = %owner.name, %id, "entry deleted");
        Ok(())
    }

    /// Move an entry out of the entries directory into the buried area.
    ///
    /// The buried name carries a timestamp so burying the same day twice keeps
    /// both files. Returns the new location.
    pub fn bury(&mut self, owner: &Owner, id: &EntryId) -> Result<PathBuf> {
        if !self.exists(owner, id) {
            return Err(FeelsError::EntryNotFound(*id));
        }

        let buried_dir = owner.buried_dir();
        let stamp = Utc::now().timestamp();
        let mut dest = buried_dir.join(format!("{}-{}.txt", id, stamp));
        let mut n = 1;
        while self.backend.exists(&dest) {
            dest = buried_dir.join(format!("{}-{}-{}.txt", id, stamp, n));
            n += 1;
        }

        self.backend.rename(&owner.entry_path(id), &dest)?;
        info!(owner = %owner.name, %id, "entry buried at {}", dest.display());
        Ok(dest)
    }
}

fn join_paragraphs(existing: &str, text: &str) -> String {
    let head = existing.trim_end_matches(['\n', '\r']);
    if head.is_empty() {
        text.to_string()
    } else {
        format!("{}\n\n{}", head, text)
    }
}
