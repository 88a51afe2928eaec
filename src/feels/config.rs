//! # Configuration
//!
//! Feels settings are managed by [`confique`], which handles layered loading
//! from a TOML file and environment variables.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `FEELS_PUBLISHING`, `FEELS_PUBLISH_DIR`, etc.
//! 2. **Owner Config**: `~/.feels/config/feels.toml`.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! There is no global settings object. The loaded value is passed into every
//! operation that needs it, and written back with [`FeelsConfig::save`] when a
//! command changes it. Only the keys the command changed are written, so a
//! value that came from the environment stays out of the file.
//!
//! `gopher_path` and `publish_dir` must be single directory names.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `publishing` | `false` | Publish to html (required by every channel) |
//! | `publish_dir` | none | Directory under `~/public_html` linked to the html tree |
//! | `atom` | `false` | Also write `atom.xml` |
//! | `gopher` | `false` | Also mirror to `~/public_gopher/<gopher_path>` |
//! | `gopher_path` | `feels` | Directory under `~/public_gopher` |
//! | `post_as_nopub` | `false` | New entries start private |
//! | `live_url` | `https://tilde.town/~` | Prefix of public URLs, the owner name follows |
//! | `feed_window_days` | `30` | Feed cutoff in days, 0 disables it |
//! | `feed_limit` | `50` | Maximum feed length |
//! | `page_size` | `10` | Rows per page in paginated views |

use crate::error::{FeelsError, Result};
use crate::paths::{validate_segment, Owner};
use crate::store::StorageBackend;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use toml::{Table, Value};

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeelsConfig {
    /// Publish entries to html. Atom and gopher also require this.
    #[config(env = "FEELS_PUBLISHING", default = false)]
    pub publishing: bool,

    /// Directory under ~/public_html the html tree is linked to.
    #[config(env = "FEELS_PUBLISH_DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_dir: Option<String>,

    /// Generate an atom feed next to the html.
    #[config(env = "FEELS_ATOM", default = false)]
    pub atom: bool,

    /// Mirror entries to gopher.
    #[config(env = "FEELS_GOPHER", default = false)]
    pub gopher: bool,

    /// Directory under ~/public_gopher for the mirror.
    #[config(default = "feels")]
    pub gopher_path: String,

    /// Whether freshly created entries start out private.
    #[config(env = "FEELS_POST_AS_NOPUB", default = false)]
    pub post_as_nopub: bool,

    /// Prefix of public URLs; the owner name is appended.
    #[config(env = "FEELS_LIVE_URL", default = "https://tilde.town/~")]
    pub live_url: String,

    /// Only entries newer than this many days show in the feed (0 = all).
    #[config(default = 30)]
    pub feed_window_days: u32,

    /// Maximum number of feed entries.
    #[config(default = 50)]
    pub feed_limit: usize,

    /// Rows per page when paginating.
    #[config(default = 10)]
    pub page_size: usize,
}

impl Default for FeelsConfig {
    fn default() -> Self {
        Self {
            publishing: false,
            publish_dir: None,
            atom: false,
            gopher: false,
            gopher_path: "feels".to_string(),
            post_as_nopub: false,
            live_url: "https://tilde.town/~".to_string(),
            feed_window_days: 30,
            feed_limit: 50,
            page_size: 10,
        }
    }
}

impl FeelsConfig {
    /// Load from environment and `path`; a missing file falls back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(path)
            .load()
            .map_err(|e| FeelsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_for(owner: &Owner) -> Result<Self> {
        Self::load(&owner.config_file())
    }

    /// Settings of another owner, from their file alone.
    ///
    /// Environment overrides belong to whoever runs feels, so they are not
    /// applied here. A missing file gives the defaults.
    pub fn read_for<B: StorageBackend>(backend: &B, owner: &Owner) -> Result<Self> {
        let Some(text) = backend.read_to_string(&owner.config_file())? else {
            return Ok(Self::default());
        };
        let layer: <Self as Config>::Layer =
            toml::from_str(&text).map_err(|e| FeelsError::Config(e.to_string()))?;
        let config = Self::builder()
            .preloaded(layer)
            .load()
            .map_err(|e| FeelsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject directory settings that would escape `public_html` or
    /// `public_gopher`.
    pub fn validate(&self) -> Result<()> {
        validate_segment(&self.gopher_path)?;
        if let Some(dir) = &self.publish_dir {
            validate_segment(dir)?;
        }
        Ok(())
    }

    /// Write the keys that differ from `previous` into the owner's file.
    ///
    /// Keys nobody changed keep whatever the file said, so values that came
    /// from `FEELS_*` variables are not written down.
    pub fn save<B: StorageBackend>(
        &self,
        backend: &B,
        owner: &Owner,
        previous: &FeelsConfig,
    ) -> Result<()> {
        self.validate()?;
        let path = owner.config_file();
        let mut table = match backend.read_to_string(&path)? {
            Some(text) => text
                .parse::<Table>()
                .map_err(|e| FeelsError::Config(e.to_string()))?,
            None => Table::new(),
        };

        let current = as_table(self)?;
        let before = as_table(previous)?;
        for key in current.keys().chain(before.keys()) {
            if current.get(key) == before.get(key) {
                continue;
            }
            match current.get(key) {
                Some(value) => table.insert(key.clone(), value.clone()),
                None => table.remove(key),
            };
        }

        let content = toml::to_string_pretty(&table)?;
        backend.atomic_write(&path, content.as_bytes())
    }

    pub fn html_enabled(&self) -> bool {
        self.publishing
    }

    pub fn atom_enabled(&self) -> bool {
        self.publishing && self.atom
    }

    pub fn gopher_enabled(&self) -> bool {
        self.publishing && self.gopher
    }

    /// Public base URL of the html tree, without trailing slash.
    pub fn publish_url(&self, owner: &Owner) -> String {
        let dir = self.publish_dir.as_deref().unwrap_or_default();
        format!("{}{}/{}", self.live_url, owner.name, dir)
            .trim_end_matches('/')
            .to_string()
    }
}

fn as_table(config: &FeelsConfig) -> Result<Table> {
    match Value::try_from(config)? {
        Value::Table(table) => Ok(table),
        _ => Err(FeelsError::Config("settings are not a table".to_string())),
    }
}
