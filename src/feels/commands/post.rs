use crate::commands::{publish_after_change, CmdMessage, CmdResult};
use crate::config::FeelsConfig;
use crate::error::Result;
use crate::ledger::{default_for_new_post, VisibilityLedger};
use crate::model::{EntryId, EntrySummary, Visibility};
use crate::paths::Owner;
use crate::store::{EntryStore, PostOutcome, StorageBackend};

/// Record `text` under `id`, appending if the day already has feels.
///
/// Only a freshly created entry picks up the `post_as_nopub` default; appending
/// keeps whatever visibility the entry already has.
pub fn run<B: StorageBackend>(
    store: &mut EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    id: &EntryId,
    text: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if text.trim().is_empty() {
        result.add_message(CmdMessage::warning("Nothing to record."));
        return Ok(result);
    }

    let outcome = store.append_or_create(owner, id, text)?;
    let mut ledger = VisibilityLedger::load(store.backend(), owner);
    if outcome == PostOutcome::Created {
        ledger.set(store.backend(), id, default_for_new_post(config))?;
    }
    let visibility = ledger.visibility(id);

    let entry = store.get_entry(owner, id)?;
    let verb = match outcome {
        PostOutcome::Created => "Recorded",
        PostOutcome::Appended => "Added to",
    };
    result.add_message(CmdMessage::success(format!(
        "{} your feels for {} ({} words)",
        verb,
        id.display_date(),
        entry.word_count()
    )));
    if visibility == Visibility::Private {
        result.add_message(CmdMessage::info("This entry is not published (nopub)."));
    }
    result.summaries.push(EntrySummary::new(&entry, visibility));

    publish_after_change(store, owner, config, &mut result);
    Ok(result)
}
