//! # Publish Synchronizer
//!
//! Public artifacts are never edited, only regenerated. Each channel derives
//! its whole content from the current public set:
//!
//! ```text
//! public set = list_entries(owner) - nopub ids, newest-first
//! ```
//!
//! | Channel | Enabled when | Artifacts |
//! |---------|--------------|-----------|
//! | [`Channel::Html`] | `publishing` | `www/index.html`, `www/YYYYMMDD.html` |
//! | [`Channel::Atom`] | `publishing` and `atom` | `www/atom.xml` |
//! | [`Channel::Gopher`] | `publishing` and `gopher` | `~/public_gopher/<gopher_path>/` |
//!
//! A sync regenerates every enabled channel and removes the artifacts of every
//! disabled one, so after it returns each channel shows exactly the public,
//! non-buried entries. Running it twice without a change in between writes
//! byte-identical files.
//!
//! The `www` tree is exposed on the web through a link at
//! `~/public_html/<publish_dir>`, managed by [`Publisher::setup_publish_dir`].

pub mod atom;
pub mod gopher;
pub mod html;

use crate::config::FeelsConfig;
use crate::error::Result;
use crate::ledger::VisibilityLedger;
use crate::model::Entry;
use crate::paths::{validate_segment, Owner, ATOM_FILE};
use crate::store::{EntryStore, StorageBackend};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Html,
    Atom,
    Gopher,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Html, Channel::Atom, Channel::Gopher];

    pub fn is_enabled(self, config: &FeelsConfig) -> bool {
        match self {
            Channel::Html => config.html_enabled(),
            Channel::Atom => config.atom_enabled(),
            Channel::Gopher => config.gopher_enabled(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Html => write!(f, "html"),
            Channel::Atom => write!(f, "atom"),
            Channel::Gopher => write!(f, "gopher"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ChannelReport {
    Synced { channel: Channel, entries: usize },
    Removed { channel: Channel },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub channels: Vec<ChannelReport>,
}

impl PublishReport {
    pub fn synced(&self) -> impl Iterator<Item = (Channel, usize)> + '_ {
        self.channels.iter().filter_map(|r| match r {
            ChannelReport::Synced { channel, entries } => Some((*channel, *entries)),
            ChannelReport::Removed { .. } => None,
        })
    }
}

/// Result of linking the `www` tree into `public_html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishDirSetup {
    Linked(PathBuf),
    AlreadyLinked(PathBuf),
    /// Something that is not our link already lives at this path.
    Conflict(PathBuf),
}

pub struct Publisher<'a, B: StorageBackend> {
    store: &'a EntryStore<B>,
    owner: &'a Owner,
    config: &'a FeelsConfig,
}

impl<'a, B: StorageBackend> Publisher<'a, B> {
    pub fn new(store: &'a EntryStore<B>, owner: &'a Owner, config: &'a FeelsConfig) -> Self {
        Self {
            store,
            owner,
            config,
        }
    }

    fn backend(&self) -> &B {
        self.store.backend()
    }

    fn gopher_dir(&self) -> Result<PathBuf> {
        validate_segment(&self.config.gopher_path)?;
        Ok(self.owner.gopher_dir(&self.config.gopher_path))
    }

    /// Entries that are neither private nor buried, newest-first.
    pub fn public_entries(&self) -> Result<Vec<Entry>> {
        let ledger = VisibilityLedger::load(self.backend(), self.owner);
        let mut entries: Vec<Entry> = self
            .store
            .list_entries(self.owner)?
            .into_iter()
            .filter(|e| !ledger.is_private(&e.id))
            .collect();
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(entries)
    }

    /// Bring every channel in line with the current entries and settings.
    pub fn sync(&self) -> Result<PublishReport> {
        if !self.config.publishing {
            return self.teardown();
        }

        let entries = self.public_entries()?;
        let mut report = PublishReport::default();
        for channel in Channel::ALL {
            report.channels.push(self.apply(channel, &entries)?);
        }
        info!(owner = %self.owner.name, public = entries.len(), "published");
        Ok(report)
    }

    /// Sync or remove a single channel, depending on whether it is enabled.
    pub fn sync_channel(&self, channel: Channel) -> Result<ChannelReport> {
        let entries = if channel.is_enabled(self.config) {
            self.public_entries()?
        } else {
            Vec::new()
        };
        self.apply(channel, &entries)
    }

    fn apply(&self, channel: Channel, entries: &[Entry]) -> Result<ChannelReport> {
        if !channel.is_enabled(self.config) {
            self.teardown_channel(channel)?;
            return Ok(ChannelReport::Removed { channel });
        }
        let count = match channel {
            Channel::Html => self.sync_html(entries)?,
            Channel::Atom => self.sync_atom(entries)?,
            Channel::Gopher => self.sync_gopher(entries)?,
        };
        debug!(owner = %self.owner.name, %channel, count, "channel synced");
        Ok(ChannelReport::Synced {
            channel,
            entries: count,
        })
    }

    pub fn sync_html(&self, entries: &[Entry]) -> Result<usize> {
        html::sync(self.backend(), self.owner, entries)
    }

    pub fn sync_atom(&self, entries: &[Entry]) -> Result<usize> {
        atom::sync(self.backend(), self.owner, self.config, entries)
    }

    pub fn sync_gopher(&self, entries: &[Entry]) -> Result<usize> {
        gopher::sync(self.backend(), self.owner, &self.gopher_dir()?, entries)
    }

    /// Remove one channel's artifacts.
    pub fn teardown_channel(&self, channel: Channel) -> Result<()> {
        let backend = self.backend();
        match channel {
            Channel::Html => backend.remove_dir_all(&self.owner.www_dir()),
            Channel::Atom => backend.remove_file(&self.owner.www_dir().join(ATOM_FILE)),
            Channel::Gopher => gopher::teardown(backend, self.owner, &self.gopher_dir()?),
        }
    }

    /// Remove everything publishing created: the link, `www` and the mirrored
    /// gopher files.
    pub fn teardown(&self) -> Result<PublishReport> {
        if let Some(dir) = &self.config.publish_dir {
            self.remove_publish_link(dir)?;
        }
        let mut report = PublishReport::default();
        // Atom lives inside www, so html goes last.
        for channel in [Channel::Atom, Channel::Gopher, Channel::Html] {
            self.teardown_channel(channel)?;
            report.channels.push(ChannelReport::Removed { channel });
        }
        info!(owner = %self.owner.name, "publishing torn down");
        Ok(report)
    }

    /// Link `~/public_html/<dir>` to the `www` tree.
    ///
    /// An existing path that is not already our link is never replaced.
    pub fn setup_publish_dir(&self, dir: &str) -> Result<PublishDirSetup> {
        validate_segment(dir)?;
        let backend = self.backend();
        let www = self.owner.www_dir();
        let link = self.owner.publish_link(dir);

        if let Some(taken) = self.publish_dir_conflict(dir) {
            warn!(owner = %self.owner.name, "{} already exists, not linking", taken.display());
            return Ok(PublishDirSetup::Conflict(taken));
        }
        backend.ensure_dir(&www)?;
        if backend.link_target(&link).as_deref() == Some(www.as_path()) {
            return Ok(PublishDirSetup::AlreadyLinked(link));
        }
        backend.link_dir(&www, &link)?;
        info!(owner = %self.owner.name, "linked {}", link.display());
        Ok(PublishDirSetup::Linked(link))
    }

    /// The occupied path, when `~/public_html/<dir>` exists and is not our link.
    pub fn publish_dir_conflict(&self, dir: &str) -> Option<PathBuf> {
        let backend = self.backend();
        let link = self.owner.publish_link(dir);
        let ours = backend.link_target(&link).as_deref() == Some(self.owner.www_dir().as_path());
        (!ours && backend.exists(&link)).then_some(link)
    }

    /// Remove `~/public_html/<dir>` if it is our link. Returns whether it was.
    pub fn remove_publish_link(&self, dir: &str) -> Result<bool> {
        let backend = self.backend();
        let link = self.owner.publish_link(dir);
        if backend.link_target(&link).as_deref() != Some(self.owner.www_dir().as_path()) {
            return Ok(false);
        }
        backend.remove_link(&link)
    }
}
