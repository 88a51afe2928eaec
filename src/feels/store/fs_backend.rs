use super::backend::{FileStat, StorageBackend};
use crate::error::{FeelsError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use uuid::Uuid;

/// Production backend over `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        Ok(())
    }
}

fn not_found_is_ok<T: Default>(res: std::io::Result<T>) -> Result<T> {
    match res {
        Ok(v) => Ok(v),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(FeelsError::Io(e)),
    }
}

/// Names of the regular files among `paths`. Entries that cannot be read are
/// skipped so one bad entry does not hide the rest of the directory.
fn file_names<I>(dir: &Path, paths: I) -> Vec<String>
where
    I: IntoIterator<Item = std::io::Result<PathBuf>>,
{
    let mut names = Vec::new();
    for path in paths {
        let path = match path {
            Ok(path) => path,
            Err(e) => {
                warn!("skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            names.push(name.to_string());
        }
    }
    names
}

impl StorageBackend for FsBackend {
    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(FeelsError::Io)?;
        }
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir).map_err(FeelsError::Io)?;
        Ok(file_names(dir, entries.map(|entry| entry.map(|e| e.path()))))
    }

    fn remove_dir_all(&self, dir: &Path) -> Result<()> {
        match fs::symlink_metadata(dir) {
            Ok(meta) if meta.file_type().is_symlink() => {
                fs::remove_file(dir).map_err(FeelsError::Io)
            }
            Ok(_) => not_found_is_ok(fs::remove_dir_all(dir)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FeelsError::Io(e)),
        }
    }

    fn remove_empty_dir(&self, dir: &Path) -> Result<bool> {
        let mut children = match fs::read_dir(dir) {
            Ok(children) => children,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(FeelsError::Io(e)),
        };
        if children.next().is_some() {
            return Ok(false);
        }
        fs::remove_dir(dir).map_err(FeelsError::Io)?;
        Ok(true)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FeelsError::Io(e)),
        }
    }

    fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.ensure_parent(path)?;

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| FeelsError::Store(format!("no file name in {}", path.display())))?;
        let tmp_path = path.with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4()));

        if let Err(e) = fs::write(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(FeelsError::Io(e));
        }
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            FeelsError::Io(e)
        })
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        not_found_is_ok(fs::remove_file(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.ensure_parent(to)?;
        fs::rename(from, to).map_err(FeelsError::Io)
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FeelsError::Io(e)),
        };
        let modified = meta.modified().unwrap_or_else(|_| SystemTime::now());
        // Not every filesystem records birth time.
        let created = meta.created().unwrap_or(modified);
        Ok(Some(FileStat {
            created: DateTime::<Utc>::from(created),
            modified: DateTime::<Utc>::from(modified),
            len: meta.len(),
        }))
    }

    #[cfg(unix)]
    fn link_dir(&self, target: &Path, link: &Path) -> Result<()> {
        self.ensure_parent(link)?;
        std::os::unix::fs::symlink(target, link).map_err(FeelsError::Io)
    }

    #[cfg(not(unix))]
    fn link_dir(&self, _target: &Path, link: &Path) -> Result<()> {
        Err(FeelsError::Store(format!(
            "cannot link {}: publishing needs symlink support",
            link.display()
        )))
    }

    fn link_target(&self, link: &Path) -> Option<PathBuf> {
        fs::read_link(link).ok()
    }

    fn remove_link(&self, link: &Path) -> Result<bool> {
        match fs::symlink_metadata(link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                fs::remove_file(link).map_err(FeelsError::Io)?;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FeelsError::Io(e)),
        }
    }
}
