use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::ledger::VisibilityLedger;
use crate::model::{EntryId, EntrySummary};
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};

/// Summaries of every entry, newest first.
pub fn run<B: StorageBackend>(store: &EntryStore<B>, owner: &Owner) -> Result<CmdResult> {
    let ledger = VisibilityLedger::load(store.backend(), owner);
    let mut summaries: Vec<EntrySummary> = store
        .list_entries(owner)?
        .iter()
        .map(|e| EntrySummary::new(e, ledger.visibility(&e.id)))
        .collect();
    summaries.sort_by(|a, b| b.id.cmp(&a.id));

    let mut result = CmdResult::default();
    if summaries.is_empty() {
        result.add_message(CmdMessage::info("No feels recorded yet."));
    }
    Ok(result.with_summaries(summaries))
}

pub fn show<B: StorageBackend>(store: &EntryStore<B>, owner: &Owner, id: &EntryId) -> Result<CmdResult> {
    let entry = store.get_entry(owner, id)?;
    Ok(CmdResult::default().with_entries(vec![entry]))
}

/// Location of the entry file, whether or not it exists yet.
pub fn path<B: StorageBackend>(store: &EntryStore<B>, owner: &Owner, id: &EntryId) -> Result<CmdResult> {
    Ok(CmdResult::default().with_paths(vec![store.entry_path(owner, id)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeelsError;
    use crate::ledger;
    use crate::model::Visibility;
    use crate::test_utils::mem_env;

    fn id(s: &str) -> EntryId {
        EntryId::parse(s).unwrap()
    }

    #[test]
    fn lists_newest_first_with_visibility() {
        let (mut store, owner) = mem_env();
        for day in ["20240601", "20240603", "20240602"] {
            store.append_or_create(&owner, &id(day), "a few words").unwrap();
        }
        ledger::toggle(store.backend(), &owner, &id("20240602")).unwrap();

        let res = run(&store, &owner).unwrap();
        let rows: Vec<_> = res
            .summaries
            .iter()
            .map(|s| (s.id.to_string(), s.visibility, s.word_count))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("20240603".to_string(), Visibility::Public, 3),
                ("20240602".to_string(), Visibility::Private, 3),
                ("20240601".to_string(), Visibility::Public, 3),
            ]
        );
    }

    #[test]
    fn empty_store_says_so() {
        let (store, owner) = mem_env();
        let res = run(&store, &owner).unwrap();
        assert!(res.summaries.is_empty());
        assert_eq!(res.messages.len(), 1);
    }

    #[test]
    fn show_missing_is_not_found() {
        let (store, owner) = mem_env();
        assert!(matches!(
            show(&store, &owner, &id("20240603")),
            Err(FeelsError::EntryNotFound(_))
        ));
        let res = path(&store, &owner, &id("20240603")).unwrap();
        assert_eq!(res.paths, vec![owner.entry_path(&id("20240603"))]);
    }
}
