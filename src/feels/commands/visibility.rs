use crate::commands::{publish_after_change, CmdMessage, CmdResult};
use crate::config::FeelsConfig;
use crate::error::{FeelsError, Result};
use crate::ledger::VisibilityLedger;
use crate::model::{EntryId, EntrySummary, Visibility};
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};

/// Flip an entry between public and nopub, then re-publish.
pub fn toggle<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    id: &EntryId,
) -> Result<CmdResult> {
    if !store.exists(owner, id) {
        return Err(FeelsError::EntryNotFound(*id));
    }

    let mut ledger = VisibilityLedger::load(store.backend(), owner);
    let visibility = ledger.toggle(store.backend(), id)?;
    let entry = store.get_entry(owner, id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(match visibility {
        Visibility::Private => format!("{} is now nopub", id.display_date()),
        Visibility::Public => format!("{} is now public", id.display_date()),
    }));
    result.summaries.push(EntrySummary::new(&entry, visibility));

    publish_after_change(store, owner, config, &mut result);
    Ok(result)
}
