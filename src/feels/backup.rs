//! # Backup & Restore
//!
//! A backup is a gzip-compressed tarball of the active entries (never the
//! buried ones), stored under `~/.feels/backups/` as
//! `feels-<owner>-<YYYYMMDD>-<HHMMSS>.tar.gz`. Members are named
//! `entries/YYYYMMDD.txt`.
//!
//! Restoring merges an archive back into the store without clobbering: an
//! archived entry whose id already exists is left in a holding directory and
//! reported, so nothing written since the backup is lost.

use crate::error::{FeelsError, Result};
use crate::model::{parse_id, EntryId};
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};
use chrono::{Local, NaiveDateTime};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

const ARCHIVE_PREFIX: &str = "feels-";
const ARCHIVE_SUFFIX: &str = ".tar.gz";
const MEMBER_DIR: &str = "entries";

struct Member {
    name: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub imported: Vec<EntryId>,
    /// Ids that already existed; their archived copies stay in `holding_dir`.
    pub skipped_conflicts: Vec<EntryId>,
    /// Member names that are not valid entry files. Never extracted.
    pub invalid: Vec<String>,
    pub holding_dir: Option<PathBuf>,
}

pub fn backup<B: StorageBackend>(store: &EntryStore<B>, owner: &Owner) -> Result<PathBuf> {
    backup_at(store, owner, Local::now().naive_local())
}

/// Archive the active entries as of `at`. Returns the archive path.
pub fn backup_at<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    let backend = store.backend();
    let mut ids = store.list_ids(owner)?;
    ids.sort();

    let mut members = Vec::with_capacity(ids.len());
    for id in ids {
        match backend.read_bytes(&owner.entry_path(&id))? {
            Some(bytes) => members.push(Member {
                name: format!("{}/{}", MEMBER_DIR, id.file_name()),
                bytes,
            }),
            None => warn!(owner = %owner.name, %id, "entry vanished during backup"),
        }
    }

    let mut archive = Vec::new();
    write_archive(&mut archive, &members)?;

    let dir = owner.backups_dir();
    let stem = format!(
        "{}{}-{}",
        ARCHIVE_PREFIX,
        owner.name,
        at.format("%Y%m%d-%H%M%S")
    );
    let mut path = dir.join(format!("{}{}", stem, ARCHIVE_SUFFIX));
    let mut n = 1;
    while backend.exists(&path) {
        path = dir.join(format!("{}-{}{}", stem, n, ARCHIVE_SUFFIX));
        n += 1;
    }

    backend.atomic_write(&path, &archive)?;
    info!(owner = %owner.name, entries = members.len(), "backup written to {}", path.display());
    Ok(path)
}

fn write_archive<W: Write>(writer: W, members: &[Member]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for member in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(member.bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar.append_data(&mut header, &member.name, member.bytes.as_slice())
            .map_err(FeelsError::Io)?;
    }

    tar.into_inner()
        .map_err(FeelsError::Io)?
        .finish()
        .map_err(FeelsError::Io)?;
    Ok(())
}

fn read_archive<R: Read>(reader: R) -> Result<Vec<Member>> {
    let archive_err = |e: std::io::Error| FeelsError::Archive(e.to_string());
    let mut tar = tar::Archive::new(GzDecoder::new(reader));

    let mut members = Vec::new();
    for entry in tar.entries().map_err(archive_err)? {
        let mut entry = entry.map_err(archive_err)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path().map_err(archive_err)?.into_owned();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(archive_err)?;
        members.push(Member {
            name: path.to_string_lossy().into_owned(),
            bytes,
        });
    }
    Ok(members)
}

/// Entry id of an archive member, which must be `entries/YYYYMMDD.txt`.
fn member_id(name: &str) -> Option<EntryId> {
    let file = name.strip_prefix(MEMBER_DIR)?.strip_prefix('/')?;
    parse_id(file)
}

/// Backups of `owner`, newest first. Other files in the directory are ignored.
pub fn list_backups<B: StorageBackend>(backend: &B, owner: &Owner) -> Result<Vec<BackupInfo>> {
    let dir = owner.backups_dir();
    let mut backups = Vec::new();
    for name in backend.list_files(&dir)? {
        if !(name.starts_with(ARCHIVE_PREFIX) && name.ends_with(ARCHIVE_SUFFIX)) {
            continue;
        }
        let path = dir.join(&name);
        let size = backend.stat(&path)?.map(|s| s.len).unwrap_or_default();
        backups.push(BackupInfo {
            path,
            file_name: name,
            size,
        });
    }
    backups.sort_by(|a, b| {
        archive_order(&b.file_name)
            .cmp(&archive_order(&a.file_name))
            .then_with(|| b.file_name.cmp(&a.file_name))
    });
    Ok(backups)
}

/// `(timestamp, n)` for `...-YYYYMMDD-HHMMSS[-n].tar.gz`, so that a later
/// backup within the same second sorts above the first one.
fn archive_order(name: &str) -> (&str, u32) {
    let stem = name.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(name);
    if let Some(stamp) = stamp_at_end(stem) {
        return (stamp, 0);
    }
    stem.rsplit_once('-')
        .and_then(|(rest, n)| Some((stamp_at_end(rest)?, n.parse().ok()?)))
        .unwrap_or(("", 0))
}

fn stamp_at_end(stem: &str) -> Option<&str> {
    const STAMP_LEN: usize = "YYYYMMDD-HHMMSS".len();
    let stamp = stem.get(stem.len().checked_sub(STAMP_LEN)?..)?;
    NaiveDateTime::parse_from_str(stamp, "%Y%m%d-%H%M%S").ok()?;
    Some(stamp)
}
