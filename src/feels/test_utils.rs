use crate::paths::Owner;
use crate::store::fs_backend::FsBackend;
use crate::store::mem_backend::MemBackend;
use crate::store::EntryStore;
use tempfile::TempDir;

/// A store over [`MemBackend`] and an owner whose home is `/home/tester`.
pub fn mem_env() -> (EntryStore<MemBackend>, Owner) {
    (
        EntryStore::with_backend(MemBackend::new()),
        Owner::new("tester", "/home/tester"),
    )
}

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub store: EntryStore<FsBackend>,
    pub owner: Owner,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let owner = Owner::new("tester", temp_dir.path().join("tester"));
        Self {
            _temp_dir: temp_dir,
            store: EntryStore::with_backend(FsBackend::new()),
            owner,
        }
    }
}
