use crate::error::{FeelsError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Timestamps and size of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub len: u64,
}

/// Abstract interface for raw storage I/O.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`EntryStore`](super::entry_store::EntryStore), the ledger, the publisher
/// and backups handle the "what". Every side effect those layers have on disk
/// goes through here, so all of them can be tested against
/// [`MemBackend`](super::mem_backend::MemBackend).
pub trait StorageBackend {
    // --- Directories ---

    /// Create a directory and its parents. Existing directories are fine.
    fn ensure_dir(&self, dir: &Path) -> Result<()>;

    /// Names of the regular files directly inside `dir`.
    /// A missing directory lists as empty; an unreadable one is an error.
    fn list_files(&self, dir: &Path) -> Result<Vec<String>>;

    /// Remove a directory tree. Missing directories are fine.
    fn remove_dir_all(&self, dir: &Path) -> Result<()>;

    /// Remove `dir` only if nothing is left inside it. Returns whether it was
    /// removed; a missing directory is not an error.
    fn remove_empty_dir(&self, dir: &Path) -> Result<bool>;

    fn exists(&self, path: &Path) -> bool;

    // --- Files ---

    /// Returns Ok(None) if the file does not exist.
    fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Replace a file's content. MUST be atomic (write to tmp then rename) so a
    /// concurrent reader never sees a partial file. Parents are created.
    fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Remove a file. Missing files are fine.
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Move a file, creating the destination's parent. Fails if `from` is missing.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn stat(&self, path: &Path) -> Result<Option<FileStat>>;

    // --- Links ---

    /// Expose `target` at `link` (a symlink on real filesystems).
    fn link_dir(&self, target: &Path, link: &Path) -> Result<()>;

    /// Where `link` points, if it is a link.
    fn link_target(&self, link: &Path) -> Option<PathBuf>;

    /// Remove `link` if it is a link. Returns whether anything was removed;
    /// real files and directories are left alone.
    fn remove_link(&self, link: &Path) -> Result<bool>;

    // --- Provided ---

    fn read_to_string(&self, path: &Path) -> Result<Option<String>> {
        match self.read_bytes(path)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
                FeelsError::Store(format!("{} is not valid UTF-8", path.display()))
            }),
            None => Ok(None),
        }
    }

    /// Copy `from` over `to` atomically.
    fn mirror_file(&self, from: &Path, to: &Path) -> Result<()> {
        let bytes = self.read_bytes(from)?.ok_or_else(|| {
            FeelsError::Store(format!("cannot mirror missing {}", from.display()))
        })?;
        self.atomic_write(to, &bytes)
    }
}
