//! # Feels Architecture
//!
//! Feels is a **journaling library**: every owner keeps one plain-text entry per
//! day and may republish the public ones as a small website, an Atom feed and a
//! Gopher mirror. The `feels` binary is one client of this library.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Parses typed ids, persists changed settings              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per user action, returns CmdResult            │
//! │  - Re-publishes after every change to the public set        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Domain (ledger, publish/, feed, neighbors, backup, ...)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait: FsBackend, MemBackend              │
//! │  - EntryStore: entries directory semantics                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Files are Truth
//!
//! The entries directory is the only source of truth. Entry identity comes
//! from the file name, timestamps from the filesystem, and every public
//! artifact can be deleted and rebuilt from the entries plus the nopub ledger.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code:
//! - Takes regular Rust function arguments, including the settings value
//! - Returns regular Rust types (`Result<CmdResult>`)
//! - **Never** writes to stdout/stderr
//! - Touches the disk only through [`store::StorageBackend`]
//!
//! ## Testing Strategy
//!
//! 1. **Domain and commands**: unit tests against `MemBackend`. This is where
//!    most tests live.
//! 2. **Storage**: `FsBackend` tests on a temporary directory.
//! 3. **CLI**: `tests/cli.rs` runs the binary against a temporary home.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per user action
//! - [`model`]: Entry ids, entries, metadata and summaries
//! - [`paths`]: Per-owner on-disk layout
//! - [`store`]: Storage abstraction and the entry store
//! - [`ledger`]: The nopub visibility ledger
//! - [`publish`]: HTML, Atom and Gopher synchronization
//! - [`feed`]: Cross-user feed and pagination
//! - [`neighbors`]: Other owners and their public entries
//! - [`backup`]: Archive and restore
//! - [`registry`]: Known owners
//! - [`config`]: Settings
//! - [`error`]: Error types

pub mod api;
pub mod backup;
pub mod commands;
pub mod config;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod model;
pub mod neighbors;
pub mod paths;
pub mod publish;
pub mod registry;
pub mod store;

#[cfg(test)]
mod test_utils;
