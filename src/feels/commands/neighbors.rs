use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FeelsError, Result};
use crate::ledger::VisibilityLedger;
use crate::model::EntryId;
use crate::neighbors;
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};

/// Everyone who keeps feels, most recently active first.
pub fn run<B: StorageBackend>(store: &EntryStore<B>, owners: &[Owner]) -> Result<CmdResult> {
    let found = neighbors::survey(store, owners);
    let mut result = CmdResult::default();
    if found.is_empty() {
        result.add_message(CmdMessage::info("Nobody here keeps feels yet."));
    }
    result.neighbors = found;
    Ok(result)
}

/// Public entries of another owner, newest first.
pub fn entries<B: StorageBackend>(store: &EntryStore<B>, owner: &Owner) -> Result<CmdResult> {
    let summaries = neighbors::public_summaries(store, owner)?;
    let mut result = CmdResult::default();
    if summaries.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "~{} has no public feels.",
            owner.name
        )));
    }
    Ok(result.with_summaries(summaries))
}

/// One public entry of another owner. Nopub entries read as missing.
pub fn read<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    id: &EntryId,
) -> Result<CmdResult> {
    if VisibilityLedger::load(store.backend(), owner).is_private(id) {
        return Err(FeelsError::EntryNotFound(*id));
    }
    let entry = store.get_entry(owner, id)?;
    Ok(CmdResult::default().with_entries(vec![entry]))
}
