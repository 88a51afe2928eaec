use super::backend::{FileStat, StorageBackend};
use crate::error::{FeelsError, Result};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone)]
struct MemFile {
    bytes: Vec<u8>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since feels is single-threaded.
/// Paths are plain keys; directories exist once something was written below
/// them or they were created explicitly.
#[derive(Default)]
pub struct MemBackend {
    files: RefCell<BTreeMap<PathBuf, MemFile>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    links: RefCell<BTreeMap<PathBuf, PathBuf>>,
    unreadable: RefCell<BTreeSet<PathBuf>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make listing `dir` fail as if permissions were missing.
    pub fn set_unreadable(&self, dir: &Path) {
        self.unreadable.borrow_mut().insert(dir.to_path_buf());
    }

    /// Test helper to set mtime directly for recency ordering.
    /// Returns true if the file existed and was updated.
    pub fn set_mtime(&self, path: &Path, mtime: DateTime<Utc>) -> bool {
        let mut files = self.files.borrow_mut();
        if let Some(file) = files.get_mut(path) {
            file.modified = mtime;
            true
        } else {
            false
        }
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(FeelsError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }

    fn add_dir_chain(&self, dir: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn add_parent(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.add_dir_chain(parent);
        }
    }
}

impl StorageBackend for MemBackend {
    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        self.check_writable()?;
        self.add_dir_chain(dir);
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<String>> {
        if self.unreadable.borrow().contains(dir) {
            return Err(FeelsError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is unreadable", dir.display()),
            )));
        }
        let files = self.files.borrow();
        Ok(files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect())
    }

    fn remove_dir_all(&self, dir: &Path) -> Result<()> {
        self.check_writable()?;
        if self.links.borrow_mut().remove(dir).is_some() {
            return Ok(());
        }
        self.files.borrow_mut().retain(|p, _| !p.starts_with(dir));
        self.dirs.borrow_mut().retain(|p| !p.starts_with(dir));
        self.links.borrow_mut().retain(|p, _| !p.starts_with(dir));
        Ok(())
    }

    fn remove_empty_dir(&self, dir: &Path) -> Result<bool> {
        self.check_writable()?;
        let inside = |p: &Path| p != dir && p.starts_with(dir);
        let occupied = self.files.borrow().keys().any(|p| inside(p.as_path()))
            || self.dirs.borrow().iter().any(|p| inside(p.as_path()))
            || self.links.borrow().keys().any(|p| inside(p.as_path()));
        if occupied {
            return Ok(false);
        }
        Ok(self.dirs.borrow_mut().remove(dir))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
            || self.dirs.borrow().contains(path)
            || self.links.borrow().contains_key(path)
    }

    fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        Ok(self.files.borrow().get(path).map(|f| f.bytes.clone()))
    }

    fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.add_parent(path);

        let now = Utc::now();
        let mut files = self.files.borrow_mut();
        let created = files.get(path).map(|f| f.created).unwrap_or(now);
        files.insert(
            path.to_path_buf(),
            MemFile {
                bytes: content.to_vec(),
                created,
                modified: now,
            },
        );
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.check_writable()?;
        self.files.borrow_mut().remove(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.check_writable()?;
        let file = self.files.borrow_mut().remove(from).ok_or_else(|| {
            FeelsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", from.display()),
            ))
        })?;
        self.add_parent(to);
        self.files.borrow_mut().insert(to.to_path_buf(), file);
        Ok(())
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        Ok(self.files.borrow().get(path).map(|f| FileStat {
            created: f.created,
            modified: f.modified,
            len: f.bytes.len() as u64,
        }))
    }

    fn link_dir(&self, target: &Path, link: &Path) -> Result<()> {
        self.check_writable()?;
        self.add_parent(link);
        self.links
            .borrow_mut()
            .insert(link.to_path_buf(), target.to_path_buf());
        Ok(())
    }

    fn link_target(&self, link: &Path) -> Option<PathBuf> {
        self.links.borrow().get(link).cloned()
    }

    fn remove_link(&self, link: &Path) -> Result<bool> {
        self.check_writable()?;
        Ok(self.links.borrow_mut().remove(link).is_some())
    }
}
