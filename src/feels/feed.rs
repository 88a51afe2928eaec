//! # Cross-User Feed
//!
//! The feed merges recent public entries of every known owner into one list,
//! most recently modified first.
//!
//! Recency uses two clocks: the window is applied to the entry's
//! date (its id), the ordering to the file's modification time. An old entry
//! that was just edited therefore stays out of the feed, while a recent entry
//! edited today moves to the top.
//!
//! Owners whose entries cannot be listed contribute nothing; a warning is
//! logged and the rest of the feed is still built.

use crate::error::Result;
use crate::ledger::VisibilityLedger;
use crate::model::{EntrySummary, Visibility};
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

/// Aggregate the feed as of today.
pub fn aggregate<B: StorageBackend>(
    store: &EntryStore<B>,
    owners: &[Owner],
    window_days: u32,
    limit: usize,
) -> Vec<EntrySummary> {
    aggregate_at(store, owners, Local::now().date_naive(), window_days, limit)
}

/// Aggregate with an explicit notion of "today".
///
/// Keeps entries dated strictly after `today - window_days` (all entries when
/// `window_days` is 0), drops private ones, orders by modification time
/// (ties by id, then owner) and keeps at most `limit`.
pub fn aggregate_at<B: StorageBackend>(
    store: &EntryStore<B>,
    owners: &[Owner],
    today: NaiveDate,
    window_days: u32,
    limit: usize,
) -> Vec<EntrySummary> {
    let cutoff = match window_days {
        0 => None,
        days => today.checked_sub_days(Days::new(u64::from(days))),
    };

    let mut items = Vec::new();
    for owner in owners {
        match owner_items(store, owner, cutoff) {
            Ok(found) => {
                debug!(owner = %owner.name, count = found.len(), "feed entries");
                items.extend(found);
            }
            Err(e) => warn!(owner = %owner.name, "skipping owner in feed: {e}"),
        }
    }

    items.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| b.id.cmp(&a.id))
            .then_with(|| a.owner.cmp(&b.owner))
    });
    items.truncate(limit);
    items
}

fn owner_items<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    cutoff: Option<NaiveDate>,
) -> Result<Vec<EntrySummary>> {
    let ledger = VisibilityLedger::load(store.backend(), owner);
    Ok(store
        .list_entries(owner)?
        .iter()
        .filter(|e| cutoff.map_or(true, |c| e.id.date() > c))
        .filter(|e| !ledger.is_private(&e.id))
        .map(|e| EntrySummary::new(e, Visibility::Public))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub total_pages: usize,
    /// Set when `page_index` was past the end and the page is empty.
    pub boundary: Option<Boundary>,
}

fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Slice page `page_index` (0-based) out of `items`.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page_index: usize) -> Page<T> {
    let size = page_size.max(1);
    let total = total_pages(items.len(), size);
    if page_index >= total {
        return Page {
            items: Vec::new(),
            page_index,
            total_pages: total,
            boundary: Some(Boundary::Last),
        };
    }
    let start = page_index * size;
    let end = (start + size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        page_index,
        total_pages: total,
        boundary: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    AtBoundary(Boundary),
}

/// Page position for a loop-driven viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page_size: usize,
    pub page_index: usize,
    pub total_pages: usize,
}

impl Pager {
    pub fn new(item_count: usize, page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page_index: 0,
            total_pages: total_pages(item_count, page_size),
        }
    }

    pub fn page<T: Clone>(&self, items: &[T]) -> Page<T> {
        paginate(items, self.page_size, self.page_index)
    }

    pub fn next(&mut self) -> Navigation {
        if self.page_index + 1 < self.total_pages {
            self.page_index += 1;
            Navigation::Moved(self.page_index)
        } else {
            Navigation::AtBoundary(Boundary::Last)
        }
    }

    pub fn prev(&mut self) -> Navigation {
        if self.page_index > 0 {
            self.page_index -= 1;
            Navigation::Moved(self.page_index)
        } else {
            Navigation::AtBoundary(Boundary::First)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger;
    use crate::model::EntryId;
    use crate::store::mem_backend::MemBackend;
    use chrono::{TimeZone, Utc};

    fn id(s: &str) -> EntryId {
        EntryId::parse(s).unwrap()
    }

    fn post(store: &mut EntryStore<MemBackend>, owner: &Owner, day: &str, mtime_hour: u32) {
        store.append_or_create(owner, &id(day), "words").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 2, 1, mtime_hour, 0, 0).unwrap();
        assert!(store.backend.set_mtime(&owner.entry_path(&id(day)), at));
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn window_is_strict_and_sorted_by_mtime() {
        let mut store = EntryStore::with_backend(MemBackend::new());
        let a = Owner::new("a", "/home/a");
        let b = Owner::new("b", "/home/b");
        post(&mut store, &a, "20240101", 5);
        post(&mut store, &b, "20240102", 3);
        post(&mut store, &a, "20240209", 9);

        let feed = aggregate_at(&store, &[a, b], today(), 30, 50);
        let got: Vec<_> = feed.iter().map(|s| (s.owner.as_str(), s.id.to_string())).collect();
        assert_eq!(
            got,
            vec![("a", "20240209".to_string()), ("b", "20240102".to_string())]
        );
    }

    #[test]
    fn zero_window_keeps_everything() {
        let mut store = EntryStore::with_backend(MemBackend::new());
        let a = Owner::new("a", "/home/a");
        post(&mut store, &a, "19990101", 1);
        post(&mut store, &a, "20240101", 2);
        assert_eq!(aggregate_at(&store, &[a], today(), 0, 50).len(), 2);
    }

    #[test]
    fn private_entries_and_limit() {
        let mut store = EntryStore::with_backend(MemBackend::new());
        let a = Owner::new("a", "/home/a");
        for (i, day) in ["20240120", "20240121", "20240122", "20240123"].iter().enumerate() {
            post(&mut store, &a, day, i as u32);
        }
        ledger::toggle(&store.backend, &a, &id("20240123")).unwrap();

        let feed = aggregate_at(&store, &[a], today(), 30, 2);
        let ids: Vec<_> = feed.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["20240122", "20240121"]);
    }

    #[test]
    fn equal_mtimes_fall_back_to_id_then_owner() {
        let mut store = EntryStore::with_backend(MemBackend::new());
        let a = Owner::new("a", "/home/a");
        let b = Owner::new("b", "/home/b");
        post(&mut store, &b, "20240120", 1);
        post(&mut store, &a, "20240120", 1);
        post(&mut store, &a, "20240121", 1);

        let feed = aggregate_at(&store, &[b, a], today(), 30, 50);
        let got: Vec<_> = feed.iter().map(|s| format!("{}/{}", s.owner, s.id)).collect();
        assert_eq!(got, vec!["a/20240121", "a/20240120", "b/20240120"]);
    }

    #[test]
    fn unreadable_owner_contributes_nothing() {
        let mut store = EntryStore::with_backend(MemBackend::new());
        let a = Owner::new("a", "/home/a");
        let b = Owner::new("b", "/home/b");
        post(&mut store, &a, "20240120", 1);
        store.backend.set_unreadable(&b.entries_dir());
        let ghost = Owner::new("ghost", "/home/ghost");

        let feed = aggregate_at(&store, &[a, b, ghost], today(), 30, 50);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].owner, "a");
    }

    #[test]
    fn fifty_items_in_pages_of_ten() {
        let items: Vec<usize> = (1..=50).collect();

        let page = paginate(&items, 10, 4);
        assert_eq!(page.items, (41..=50).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.boundary, None);

        let past = paginate(&items, 10, 5);
        assert!(past.items.is_empty());
        assert_eq!(past.boundary, Some(Boundary::Last));
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let page = paginate::<usize>(&[], 10, 0);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.boundary, None);
    }

    #[test]
    fn pager_stops_at_both_ends() {
        let items: Vec<usize> = (0..25).collect();
        let mut pager = Pager::new(items.len(), 10);

        assert_eq!(pager.prev(), Navigation::AtBoundary(Boundary::First));
        assert_eq!(pager.next(), Navigation::Moved(1));
        assert_eq!(pager.next(), Navigation::Moved(2));
        assert_eq!(pager.page(&items).items, vec![20, 21, 22, 23, 24]);
        assert_eq!(pager.next(), Navigation::AtBoundary(Boundary::Last));
        assert_eq!(pager.page_index, 2);
        assert_eq!(pager.prev(), Navigation::Moved(1));
    }
}
