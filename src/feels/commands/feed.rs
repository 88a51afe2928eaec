use crate::commands::{CmdMessage, CmdResult};
use crate::config::FeelsConfig;
use crate::error::Result;
use crate::feed::{self, Boundary};
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};

/// One page of the cross-user feed.
pub fn run<B: StorageBackend>(
    store: &EntryStore<B>,
    owners: &[Owner],
    config: &FeelsConfig,
    page_index: usize,
) -> Result<CmdResult> {
    let items = feed::aggregate(store, owners, config.feed_window_days, config.feed_limit);
    let page = feed::paginate(&items, config.page_size, page_index);

    let mut result = CmdResult::default();
    if items.is_empty() {
        result.add_message(CmdMessage::info("Nobody has posted recently."));
    } else if page.boundary == Some(Boundary::Last) {
        result.add_message(CmdMessage::warning(format!(
            "There are only {} pages.",
            page.total_pages
        )));
    }
    result.feed = Some(page);
    Ok(result)
}
