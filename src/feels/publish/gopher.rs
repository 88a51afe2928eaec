//! Gopher channel: a plain-text mirror of the public entries plus a gophermap.

use crate::error::Result;
use crate::model::{parse_id, Entry, EntryId};
use crate::paths::{Owner, GOPHERMAP_FILE};
use crate::store::StorageBackend;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

fn header(owner: &str) -> String {
    format!(
        "\n welcome to {owner}'s feels on gopher.\n\n \
         this file was created on their behalf by feels.\n\n"
    )
}

/// The gophermap for `entries` (newest-first).
pub fn render_map(owner: &Owner, entries: &[Entry]) -> String {
    let mut map = header(&owner.name);
    for entry in entries {
        let file = entry.id.file_name();
        map.push_str(&format!("0{}\t{}\n", file, file));
    }
    map
}

pub fn sync<B: StorageBackend>(
    backend: &B,
    owner: &Owner,
    dir: &Path,
    entries: &[Entry],
) -> Result<usize> {
    backend.ensure_dir(dir)?;

    for entry in entries {
        backend.mirror_file(&owner.entry_path(&entry.id), &dir.join(entry.id.file_name()))?;
    }

    let live: BTreeSet<EntryId> = entries.iter().map(|e| e.id).collect();
    for name in backend.list_files(dir)? {
        if let Some(id) = parse_id(&name) {
            if !live.contains(&id) {
                backend.remove_file(&dir.join(&name))?;
                debug!(owner = %owner.name, %id, "removed stale gopher entry");
            }
        }
    }

    backend.atomic_write(&dir.join(GOPHERMAP_FILE), render_map(owner, entries).as_bytes())?;
    Ok(entries.len())
}

/// Remove what [`sync`] wrote: mirrored entries and the gophermap. Anything
/// else the owner keeps in `dir` stays, and `dir` itself goes only once empty.
pub fn teardown<B: StorageBackend>(backend: &B, owner: &Owner, dir: &Path) -> Result<()> {
    for name in backend.list_files(dir)? {
        if name == GOPHERMAP_FILE || parse_id(&name).is_some() {
            backend.remove_file(&dir.join(&name))?;
        }
    }
    if !backend.remove_empty_dir(dir)? && backend.exists(dir) {
        debug!(owner = %owner.name, "kept {}, it holds other files", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn map_lists_entries_in_order() {
        let owner = Owner::new("endorphant", "/home/endorphant");
        let now = Utc::now();
        let entries: Vec<Entry> = ["20240604", "20240603"]
            .iter()
            .map(|id| Entry {
                id: EntryId::parse(id).unwrap(),
                owner: owner.name.clone(),
                body: String::new(),
                created_at: now,
                modified_at: now,
            })
            .collect();

        let map = render_map(&owner, &entries);
        assert!(map.contains("endorphant's feels"));
        assert!(map.ends_with("020240604.txt\t20240604.txt\n020240603.txt\t20240603.txt\n"));
    }

    #[test]
    fn teardown_keeps_other_files() {
        let (mut store, owner) = crate::test_utils::mem_env();
        let day = EntryId::parse("20240603").unwrap();
        store.append_or_create(&owner, &day, "hi").unwrap();
        let entries = store.list_entries(&owner).unwrap();
        let dir = owner.gopher_dir("feels");
        sync(&store.backend, &owner, &dir, &entries).unwrap();
        store
            .backend
            .atomic_write(&dir.join("phlog-notes.txt"), b"mine")
            .unwrap();

        teardown(&store.backend, &owner, &dir).unwrap();
        assert_eq!(
            store.backend.list_files(&dir).unwrap(),
            vec!["phlog-notes.txt".to_string()]
        );

        store.backend.remove_file(&dir.join("phlog-notes.txt")).unwrap();
        teardown(&store.backend, &owner, &dir).unwrap();
        assert!(!store.backend.exists(&dir));
    }
}
