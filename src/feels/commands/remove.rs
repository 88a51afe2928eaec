use crate::commands::{publish_after_change, CmdMessage, CmdResult};
use crate::config::FeelsConfig;
use crate::error::Result;
use crate::ledger::VisibilityLedger;
use crate::model::EntryId;
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};

/// Permanently delete an entry.
pub fn delete<B: StorageBackend>(
    store: &mut EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    id: &EntryId,
) -> Result<CmdResult> {
    store.delete(owner, id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Deleted your feels for {}",
        id.display_date()
    )));
    after_removal(store, owner, config, &mut result)?;
    Ok(result)
}

/// Move an entry into the buried area. It stays on disk but is never listed
/// or published again.
pub fn bury<B: StorageBackend>(
    store: &mut EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    id: &EntryId,
) -> Result<CmdResult> {
    let dest = store.bury(owner, id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Buried your feels for {}",
        id.display_date()
    )));
    result.paths.push(dest);
    after_removal(store, owner, config, &mut result)?;
    Ok(result)
}

fn after_removal<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    result: &mut CmdResult,
) -> Result<()> {
    let live = store.list_ids(owner)?;
    VisibilityLedger::load(store.backend(), owner).prune(store.backend(), &live)?;
    publish_after_change(store, owner, config, result);
    Ok(())
}
