//! # Entry Identity & Metadata
//!
//! An entry is identified by the calendar day it was written on. The identity
//! lives in the file name (`YYYYMMDD.txt`) and nowhere else: there is no index
//! file to drift out of sync with the entries directory.
//!
//! [`EntryId`] can only be built from a real date, so code that holds one never
//! has to re-validate it. Anything in the entries directory that does not parse
//! is simply not an entry.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FeelsError;

/// Extension every entry file carries.
pub const ENTRY_EXT: &str = "txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EntryId(NaiveDate);

impl EntryId {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a bare `YYYYMMDD` stem.
    pub fn parse(stem: &str) -> Option<Self> {
        if stem.len() != 8 || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = stem[0..4].parse().ok()?;
        let month: u32 = stem[4..6].parse().ok()?;
        let day: u32 = stem[6..8].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self, ENTRY_EXT)
    }

    /// Human form used in listings, e.g. "03 June 2024".
    pub fn display_date(&self) -> String {
        self.0.format("%d %B %Y").to_string()
    }

    pub fn iso_date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl FromStr for EntryId {
    type Err = FeelsError;

    /// Accepts `YYYYMMDD` as typed by a user, with or without the `.txt` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        parse_id(trimmed)
            .or_else(|| Self::parse(trimmed))
            .ok_or_else(|| FeelsError::InvalidEntryId(s.to_string()))
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for EntryId {
    type Error = FeelsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Derive an entry id from a file name.
///
/// Returns `None` for anything that is not exactly `YYYYMMDD.txt` with a real
/// calendar date. Callers enumerating directories skip those names silently.
pub fn parse_id(filename: &str) -> Option<EntryId> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if ext != ENTRY_EXT {
        return None;
    }
    EntryId::parse(stem)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "nopub"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub owner: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Entry {
    pub fn word_count(&self) -> usize {
        word_count(&self.body)
    }
}

/// Derived, side-effect free description of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryMeta {
    pub id: EntryId,
    pub owner: String,
    pub word_count: usize,
    pub display_date: String,
    pub byte_size: usize,
}

pub fn compute_metadata(entry: &Entry) -> EntryMeta {
    EntryMeta {
        id: entry.id,
        owner: entry.owner.clone(),
        word_count: entry.word_count(),
        display_date: entry.id.display_date(),
        byte_size: entry.body.len(),
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// What the shell renders for one row of a listing or feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub id: EntryId,
    pub owner: String,
    pub word_count: usize,
    pub display_date: String,
    pub byte_size: usize,
    pub modified_at: DateTime<Utc>,
    pub visibility: Visibility,
}

impl EntrySummary {
    pub fn new(entry: &Entry, visibility: Visibility) -> Self {
        let meta = compute_metadata(entry);
        Self {
            id: meta.id,
            owner: meta.owner,
            word_count: meta.word_count,
            display_date: meta.display_date,
            byte_size: meta.byte_size,
            modified_at: entry.modified_at,
            visibility,
        }
    }
}
