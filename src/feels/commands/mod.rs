//! # Commands
//!
//! One module per user action. Commands combine the store, the ledger and the
//! publisher, and return a [`CmdResult`] describing what happened. They never
//! print.
//!
//! Every command that changes the public set (posting, toggling, deleting,
//! burying, restoring) ends with a publish sync, so the public artifacts never
//! lag behind the entries. A failed sync does not undo the change; it is
//! reported as a warning.

use crate::backup::{BackupInfo, RestoreReport};
use crate::config::FeelsConfig;
use crate::feed::Page;
use crate::model::{Entry, EntrySummary};
use crate::neighbors::Neighbor;
use crate::paths::Owner;
use crate::publish::{PublishReport, Publisher};
use crate::store::{EntryStore, StorageBackend};
use std::path::PathBuf;
use tracing::warn;

pub mod backup;
pub mod feed;
pub mod list;
pub mod neighbors;
pub mod post;
pub mod publishing;
pub mod remove;
pub mod visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub summaries: Vec<EntrySummary>,
    pub entries: Vec<Entry>,
    pub paths: Vec<PathBuf>,
    pub publish: Option<PublishReport>,
    pub restore: Option<RestoreReport>,
    pub backups: Vec<BackupInfo>,
    pub feed: Option<Page<EntrySummary>>,
    pub neighbors: Vec<Neighbor>,
    /// Set when the command changed settings that need saving.
    pub config: Option<FeelsConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_summaries(mut self, summaries: Vec<EntrySummary>) -> Self {
        self.summaries = summaries;
        self
    }

    pub fn with_entries(mut self, entries: Vec<Entry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_config(mut self, config: FeelsConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

/// Re-sync the public artifacts after a change to the public set.
///
/// Does nothing while publishing is off.
pub(crate) fn publish_after_change<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    result: &mut CmdResult,
) {
    if !config.publishing {
        return;
    }
    match Publisher::new(store, owner, config).sync() {
        Ok(report) => result.publish = Some(report),
        Err(e) => {
            warn!(owner = %owner.name, "publish failed: {e}");
            result.add_message(CmdMessage::warning(format!(
                "Your entries are saved, but publishing failed: {}",
                e
            )));
        }
    }
}
