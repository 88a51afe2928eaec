use crate::commands::{CmdMessage, CmdResult};
use crate::config::FeelsConfig;
use crate::error::{FeelsError, Result};
use crate::paths::{validate_segment, Owner};
use crate::publish::{Channel, ChannelReport, PublishDirSetup, PublishReport, Publisher};
use crate::store::{EntryStore, StorageBackend};
use std::path::Path;

/// Regenerate every channel from the current entries.
pub fn sync<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
) -> Result<CmdResult> {
    let report = Publisher::new(store, owner, config).sync()?;
    let mut result = CmdResult::default();
    if config.publishing {
        for (channel, count) in report.synced() {
            result.add_message(CmdMessage::success(format!(
                "Published {} entries to {}",
                count, channel
            )));
        }
    } else {
        result.add_message(CmdMessage::info("Publishing is off; nothing is public."));
    }
    result.publish = Some(report);
    Ok(result)
}

/// Turn publishing on or off.
///
/// Turning it on links `~/public_html/<dir>` to the html tree and publishes.
/// `dir` replaces the configured publish dir; the old link is removed. An
/// existing path at the new location is reported and nothing changes.
/// Turning it off removes every public artifact.
pub fn set_publishing<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    on: bool,
    dir: Option<String>,
) -> Result<CmdResult> {
    let mut next = config.clone();
    let mut result = CmdResult::default();

    if !on {
        next.publishing = false;
        let report = Publisher::new(store, owner, &next).teardown()?;
        result.publish = Some(report);
        result.add_message(CmdMessage::success(
            "Publishing is off. Your public pages were removed.",
        ));
        return Ok(result.with_config(next));
    }

    let dir = match dir.or_else(|| config.publish_dir.clone()) {
        Some(dir) => validate_dir(dir)?,
        None => {
            return Err(FeelsError::Config(
                "choose a directory under public_html to publish to (--dir)".to_string(),
            ))
        }
    };

    // A taken path leaves the current settings and artifacts as they are.
    if let Some(path) = Publisher::new(store, owner, config).publish_dir_conflict(&dir) {
        result.add_message(conflict_message(&path));
        return Ok(result);
    }

    if let Some(old) = config.publish_dir.as_deref().filter(|old| *old != dir) {
        Publisher::new(store, owner, config).remove_publish_link(old)?;
    }
    next.publish_dir = Some(dir.clone());

    match Publisher::new(store, owner, &next).setup_publish_dir(&dir)? {
        PublishDirSetup::Conflict(path) => {
            // The old link is already gone, so publishing goes off entirely.
            result.add_message(conflict_message(&path));
            next.publishing = false;
            result.publish = Some(Publisher::new(store, owner, &next).teardown()?);
            return Ok(result.with_config(next));
        }
        PublishDirSetup::Linked(path) | PublishDirSetup::AlreadyLinked(path) => {
            result.add_message(CmdMessage::info(format!(
                "Publishing at {} ({})",
                next.publish_url(owner),
                path.display()
            )));
        }
    }

    next.publishing = true;
    let report = Publisher::new(store, owner, &next).sync()?;
    result.add_message(CmdMessage::success(publish_summary(&report)));
    result.publish = Some(report);
    Ok(result.with_config(next))
}

/// Enable or disable the atom or gopher channel.
pub fn set_channel<B: StorageBackend>(
    store: &EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    channel: Channel,
    on: bool,
) -> Result<CmdResult> {
    let mut next = config.clone();
    match channel {
        Channel::Atom => next.atom = on,
        Channel::Gopher => next.gopher = on,
        Channel::Html => {
            return Err(FeelsError::Config(
                "html follows the publishing setting".to_string(),
            ))
        }
    }

    let mut result = CmdResult::default();
    let report = Publisher::new(store, owner, &next).sync_channel(channel)?;
    match report {
        ChannelReport::Synced { entries, .. } => result.add_message(CmdMessage::success(
            format!("{} is on ({} entries)", channel, entries),
        )),
        ChannelReport::Removed { .. } if on => result.add_message(CmdMessage::warning(format!(
            "{} is on, but nothing is published until publishing is turned on",
            channel
        ))),
        ChannelReport::Removed { .. } => {
            result.add_message(CmdMessage::success(format!("{} is off", channel)))
        }
    }
    result.publish = Some(PublishReport {
        channels: vec![report],
    });
    Ok(result.with_config(next))
}

fn publish_summary(report: &PublishReport) -> String {
    let parts: Vec<String> = report
        .synced()
        .map(|(channel, count)| format!("{} ({})", channel, count))
        .collect();
    format!("Published: {}", parts.join(", "))
}

fn conflict_message(path: &Path) -> CmdMessage {
    CmdMessage::error(format!(
        "{} already exists and is not managed by feels; pick another directory.",
        path.display()
    ))
}

/// A publish dir is a single path segment under public_html.
fn validate_dir(dir: String) -> Result<String> {
    let trimmed = dir.trim().trim_matches('/').to_string();
    validate_segment(&trimmed)
        .map_err(|_| FeelsError::Config(format!("'{}' is not a valid publish directory", dir)))?;
    Ok(trimmed)
}
