//! # Storage Layer
//!
//! Feels keeps no database. The entries directory **is** the store:
//!
//! - **Files are Truth**: `entries/YYYYMMDD.txt` exists, so the entry exists.
//!   Identity comes from the file name, timestamps from the filesystem.
//! - **Nothing cached**: every listing re-reads the directory, so edits made
//!   in an external editor, or by another session, are picked up immediately.
//! - **Invalid names are invisible**: anything that is not a valid
//!   `YYYYMMDD.txt` is ignored by every enumeration.
//!
//! ## Layers
//!
//! - [`backend::StorageBackend`]: raw I/O (list, read, atomic write, rename,
//!   links). Everything that touches the disk in this crate goes through it.
//! - [`entry_store::EntryStore`]: entry semantics on top of a backend:
//!   listing, append-or-create, delete and bury.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production, over `std::fs`, with
//!   write-to-temp-then-rename for every full rewrite.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.
//!
//! ## Deletion Lifecycle
//!
//! - **Bury**: the file moves to `buried/` under a timestamped name. It is
//!   never listed or published again, and the tool offers no way back.
//! - **Delete**: the file is removed. Irreversible.

pub mod backend;
pub mod entry_store;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::{FileStat, StorageBackend};
pub use entry_store::{EntryStore, PostOutcome};
