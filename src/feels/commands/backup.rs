use crate::backup;
use crate::commands::{publish_after_change, CmdMessage, CmdResult};
use crate::config::FeelsConfig;
use crate::error::Result;
use crate::paths::Owner;
use crate::store::{EntryStore, StorageBackend};
use std::path::Path;

pub fn create<B: StorageBackend>(store: &EntryStore<B>, owner: &Owner) -> Result<CmdResult> {
    let path = backup::backup(store, owner)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Backed up your feels to {}",
        path.display()
    )));
    Ok(result.with_paths(vec![path]))
}

pub fn list<B: StorageBackend>(store: &EntryStore<B>, owner: &Owner) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    result.backups = backup::list_backups(store.backend(), owner)?;
    if result.backups.is_empty() {
        result.add_message(CmdMessage::info("No backups yet."));
    }
    Ok(result)
}

/// Merge an archive into the store and re-publish if anything came back.
pub fn restore<B: StorageBackend>(
    store: &mut EntryStore<B>,
    owner: &Owner,
    config: &FeelsConfig,
    archive: &Path,
) -> Result<CmdResult> {
    let report = backup::restore(store, owner, archive)?;
    let mut result = CmdResult::default();

    result.add_message(CmdMessage::success(format!(
        "Restored {} entries",
        report.imported.len()
    )));
    if !report.skipped_conflicts.is_empty() {
        let ids: Vec<String> = report
            .skipped_conflicts
            .iter()
            .map(|id| id.to_string())
            .collect();
        let holding = report
            .holding_dir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        result.add_message(CmdMessage::warning(format!(
            "Kept your current version of {}; the archived copies are in {}",
            ids.join(", "),
            holding
        )));
    }
    if !report.invalid.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "Ignored {} archive members that are not entries",
            report.invalid.len()
        )));
    }

    if !report.imported.is_empty() {
        publish_after_change(store, owner, config, &mut result);
    }
    result.restore = Some(report);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryId;
    use crate::paths::INDEX_FILE;
    use crate::test_utils::mem_env;

    #[test]
    fn restore_republishes_imported_entries() {
        let (mut store, owner) = mem_env();
        let config = FeelsConfig {
            publishing: true,
            publish_dir: Some("blog".into()),
            ..Default::default()
        };
        let day = EntryId::parse("20240603").unwrap();
        store.append_or_create(&owner, &day, "from the past").unwrap();

        let res = create(&store, &owner).unwrap();
        let archive = res.paths[0].clone();
        assert_eq!(list(&store, &owner).unwrap().backups.len(), 1);

        store.delete(&owner, &day).unwrap();
        let res = restore(&mut store, &owner, &config, &archive).unwrap();
        assert_eq!(res.restore.unwrap().imported, vec![day]);
        assert!(res.publish.is_some());

        let index = store
            .backend()
            .read_to_string(&owner.www_dir().join(INDEX_FILE))
            .unwrap()
            .unwrap();
        assert!(index.contains("from the past"));
    }

    #[test]
    fn conflicts_are_warned_about() {
        let (mut store, owner) = mem_env();
        let day = EntryId::parse("20240603").unwrap();
        store.append_or_create(&owner, &day, "v1").unwrap();
        let archive = create(&store, &owner).unwrap().paths[0].clone();

        let res = restore(&mut store, &owner, &FeelsConfig::default(), &archive).unwrap();
        assert_eq!(res.restore.as_ref().unwrap().skipped_conflicts, vec![day]);
        assert!(res.publish.is_none());
        assert!(res.messages.iter().any(|m| m.content.contains("20240603")));
    }
}
