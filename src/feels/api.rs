//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for every feels operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (entry ids typed by the user become [`EntryId`]s)
//! - **Persists settings** that a command changed
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It never prints and holds no presentation logic.
//!
//! ## Generic Over StorageBackend
//!
//! `FeelsApi<B: StorageBackend>` runs on `FsBackend` in production and on
//! `MemBackend` in tests.

use crate::commands;
use crate::config::FeelsConfig;
use crate::error::Result;
use crate::model::EntryId;
use crate::paths::Owner;
use crate::publish::Channel;
use crate::store::{EntryStore, StorageBackend};
use std::path::Path;

pub struct FeelsApi<B: StorageBackend> {
    store: EntryStore<B>,
    owner: Owner,
    config: FeelsConfig,
}

impl<B: StorageBackend> FeelsApi<B> {
    pub fn new(backend: B, owner: Owner, config: FeelsConfig) -> Self {
        Self {
            store: EntryStore::with_backend(backend),
            owner,
            config,
        }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn config(&self) -> &FeelsConfig {
        &self.config
    }

    pub fn store(&self) -> &EntryStore<B> {
        &self.store
    }

    pub fn post(&mut self, id: &str, text: &str) -> Result<commands::CmdResult> {
        let id = parse_id(id)?;
        commands::post::run(&mut self.store, &self.owner, &self.config, &id, text)
    }

    pub fn post_today(&mut self, text: &str) -> Result<commands::CmdResult> {
        let id = EntryId::today();
        commands::post::run(&mut self.store, &self.owner, &self.config, &id, text)
    }

    pub fn list(&self) -> Result<commands::CmdResult> {
        commands::list::run(&self.store, &self.owner)
    }

    pub fn show(&self, id: &str) -> Result<commands::CmdResult> {
        commands::list::show(&self.store, &self.owner, &parse_id(id)?)
    }

    pub fn entry_path(&self, id: &str) -> Result<commands::CmdResult> {
        commands::list::path(&self.store, &self.owner, &parse_id(id)?)
    }

    pub fn toggle_visibility(&self, id: &str) -> Result<commands::CmdResult> {
        commands::visibility::toggle(&self.store, &self.owner, &self.config, &parse_id(id)?)
    }

    pub fn delete(&mut self, id: &str) -> Result<commands::CmdResult> {
        let id = parse_id(id)?;
        commands::remove::delete(&mut self.store, &self.owner, &self.config, &id)
    }

    pub fn bury(&mut self, id: &str) -> Result<commands::CmdResult> {
        let id = parse_id(id)?;
        commands::remove::bury(&mut self.store, &self.owner, &self.config, &id)
    }

    pub fn sync(&self) -> Result<commands::CmdResult> {
        commands::publishing::sync(&self.store, &self.owner, &self.config)
    }

    pub fn set_publishing(&mut self, on: bool, dir: Option<String>) -> Result<commands::CmdResult> {
        let result =
            commands::publishing::set_publishing(&self.store, &self.owner, &self.config, on, dir)?;
        self.apply_config(&result)?;
        Ok(result)
    }

    pub fn set_channel(&mut self, channel: Channel, on: bool) -> Result<commands::CmdResult> {
        let result =
            commands::publishing::set_channel(&self.store, &self.owner, &self.config, channel, on)?;
        self.apply_config(&result)?;
        Ok(result)
    }

    pub fn backup(&self) -> Result<commands::CmdResult> {
        commands::backup::create(&self.store, &self.owner)
    }

    pub fn list_backups(&self) -> Result<commands::CmdResult> {
        commands::backup::list(&self.store, &self.owner)
    }

    pub fn restore(&mut self, archive: &Path) -> Result<commands::CmdResult> {
        commands::backup::restore(&mut self.store, &self.owner, &self.config, archive)
    }

    pub fn feed(&self, owners: &[Owner], page_index: usize) -> Result<commands::CmdResult> {
        commands::feed::run(&self.store, owners, &self.config, page_index)
    }

    pub fn neighbors(&self, owners: &[Owner]) -> Result<commands::CmdResult> {
        commands::neighbors::run(&self.store, owners)
    }

    pub fn neighbor_entries(&self, neighbor: &Owner) -> Result<commands::CmdResult> {
        commands::neighbors::entries(&self.store, neighbor)
    }

    pub fn read_neighbor(&self, neighbor: &Owner, id: &str) -> Result<commands::CmdResult> {
        commands::neighbors::read(&self.store, neighbor, &parse_id(id)?)
    }

    fn apply_config(&mut self, result: &commands::CmdResult) -> Result<()> {
        if let Some(config) = &result.config {
            if *config != self.config {
                config.save(self.store.backend(), &self.owner, &self.config)?;
                self.config = config.clone();
            }
        }
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<EntryId> {
    id.parse()
}
