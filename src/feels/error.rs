use crate::model::EntryId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeelsError {
    #[error("No feels recorded for {0}")]
    EntryNotFound(EntryId),

    #[error("Not a valid entry date: {0} (expected YYYYMMDD)")]
    InvalidEntryId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, FeelsError>;
