//! # Owner Layout
//!
//! Everything an owner has lives under their home directory:
//!
//! ```text
//! ~/.feels/
//! ├── entries/            # YYYYMMDD.txt, the source of truth
//! ├── buried/             # soft-removed entries, never enumerated
//! ├── config/
//! │   ├── feels.toml      # settings
//! │   ├── nopub           # visibility ledger
//! │   ├── header.txt      # optional html header fragment
//! │   └── footer.txt      # optional html footer fragment
//! ├── www/                # generated html + atom.xml
//! └── backups/            # feels-<owner>-<stamp>.tar.gz
//! ~/public_html/<publish_dir>   -> ~/.feels/www
//! ~/public_gopher/<gopher_path>/  gophermap + mirrored entries
//! ```

use crate::error::{FeelsError, Result};
use crate::model::EntryId;
use std::path::PathBuf;

pub const APP_DIR: &str = ".feels";
pub const CONFIG_FILE: &str = "feels.toml";
pub const LEDGER_FILE: &str = "nopub";
pub const INDEX_FILE: &str = "index.html";
pub const ATOM_FILE: &str = "atom.xml";
pub const GOPHERMAP_FILE: &str = "gophermap";

/// Check that `name` is a single directory name.
///
/// Publish dirs and gopher paths are joined onto `public_html` and
/// `public_gopher`; anything that could climb out of them is refused.
pub fn validate_segment(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(FeelsError::Config(format!(
            "'{}' must be a single directory name",
            name
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub name: String,
    pub home: PathBuf,
}

impl Owner {
    pub fn new(name: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.home.join(APP_DIR)
    }

    pub fn entries_dir(&self) -> PathBuf {
        self.root().join("entries")
    }

    pub fn buried_dir(&self) -> PathBuf {
        self.root().join("buried")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root().join("config")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    pub fn ledger_file(&self) -> PathBuf {
        self.config_dir().join(LEDGER_FILE)
    }

    pub fn header_file(&self) -> PathBuf {
        self.config_dir().join("header.txt")
    }

    pub fn footer_file(&self) -> PathBuf {
        self.config_dir().join("footer.txt")
    }

    pub fn www_dir(&self) -> PathBuf {
        self.root().join("www")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root().join("backups")
    }

    pub fn entry_path(&self, id: &EntryId) -> PathBuf {
        self.entries_dir().join(id.file_name())
    }

    pub fn public_html(&self) -> PathBuf {
        self.home.join("public_html")
    }

    pub fn public_gopher(&self) -> PathBuf {
        self.home.join("public_gopher")
    }

    /// Where the `www` tree is exposed for a given publish dir.
    pub fn publish_link(&self, publish_dir: &str) -> PathBuf {
        self.public_html().join(publish_dir)
    }

    pub fn gopher_dir(&self, gopher_path: &str) -> PathBuf {
        self.public_gopher().join(gopher_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_in_home() {
        let owner = Owner::new("endorphant", "/home/endorphant");
        assert_eq!(
            owner.entries_dir(),
            PathBuf::from("/home/endorphant/.feels/entries")
        );
        assert_eq!(
            owner.ledger_file(),
            PathBuf::from("/home/endorphant/.feels/config/nopub")
        );
        assert_eq!(
            owner.publish_link("blog"),
            PathBuf::from("/home/endorphant/public_html/blog")
        );
        assert_eq!(
            owner.gopher_dir("feels"),
            PathBuf::from("/home/endorphant/public_gopher/feels")
        );
    }

    #[test]
    fn only_single_segments_are_valid() {
        assert!(validate_segment("feels").is_ok());
        assert!(validate_segment("my.blog").is_ok());
        for bad in ["", ".", "..", "a/b", "../x", "a\\b"] {
            assert!(
                matches!(validate_segment(bad), Err(FeelsError::Config(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn entry_path_uses_file_name() {
        let owner = Owner::new("a", "/h/a");
        let id = EntryId::parse("20240603").unwrap();
        assert_eq!(
            owner.entry_path(&id),
            PathBuf::from("/h/a/.feels/entries/20240603.txt")
        );
    }
}
