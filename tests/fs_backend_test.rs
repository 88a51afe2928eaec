use feels::backup;
use feels::model::EntryId;
use feels::paths::Owner;
use feels::store::backend::StorageBackend;
use feels::store::fs_backend::FsBackend;
use feels::store::EntryStore;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    (TempDir::new().unwrap(), FsBackend::new())
}

fn id(s: &str) -> EntryId {
    EntryId::parse(s).unwrap()
}

#[test]
fn test_fs_backend_basic_io() {
    let (dir, backend) = setup();
    let path = dir.path().join("nested/deeper/file.txt");

    backend.atomic_write(&path, b"Hello World").unwrap();
    assert_eq!(
        backend.read_to_string(&path).unwrap().as_deref(),
        Some("Hello World")
    );

    backend.remove_file(&path).unwrap();
    assert_eq!(backend.read_bytes(&path).unwrap(), None);
    // Removing twice is fine.
    backend.remove_file(&path).unwrap();
}

#[test]
fn test_fs_backend_atomic_write_artifacts() {
    let (dir, backend) = setup();
    let path = dir.path().join("entry.txt");

    backend.atomic_write(&path, b"first").unwrap();
    backend.atomic_write(&path, b"second").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "second");

    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_fs_backend_lists_only_files() {
    let (dir, backend) = setup();
    backend.atomic_write(&dir.path().join("a.txt"), b"a").unwrap();
    backend.ensure_dir(&dir.path().join("sub")).unwrap();

    assert_eq!(backend.list_files(dir.path()).unwrap(), vec!["a.txt".to_string()]);
    assert!(backend
        .list_files(&dir.path().join("missing"))
        .unwrap()
        .is_empty());
}

#[cfg(unix)]
#[test]
fn test_fs_backend_links() {
    let (dir, backend) = setup();
    let target = dir.path().join("www");
    let link = dir.path().join("public_html/blog");
    backend.atomic_write(&target.join("index.html"), b"<p>hi</p>").unwrap();

    backend.link_dir(&target, &link).unwrap();
    assert_eq!(backend.link_target(&link), Some(target.clone()));
    assert_eq!(fs::read_to_string(link.join("index.html")).unwrap(), "<p>hi</p>");

    // remove_dir_all on a link removes only the link.
    backend.remove_dir_all(&link).unwrap();
    assert!(!backend.exists(&link));
    assert!(target.join("index.html").exists());

    // A real directory is never treated as our link.
    fs::create_dir_all(&link).unwrap();
    assert!(!backend.remove_link(&link).unwrap());
    assert!(link.is_dir());
}

#[test]
fn test_backup_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let owner = Owner::new("tester", dir.path().join("tester"));
    let mut store = EntryStore::with_backend(FsBackend::new());
    store.append_or_create(&owner, &id("20240601"), "one").unwrap();
    store.append_or_create(&owner, &id("20240602"), "two\n\nparagraphs").unwrap();

    let archive = backup::backup(&store, &owner).unwrap();
    assert!(archive.is_file());
    assert_eq!(backup::list_backups(store.backend(), &owner).unwrap().len(), 1);

    fs::remove_dir_all(owner.entries_dir()).unwrap();
    assert!(store.list_entries(&owner).unwrap().is_empty());

    let report = backup::restore(&mut store, &owner, &archive).unwrap();
    assert_eq!(report.imported, vec![id("20240601"), id("20240602")]);
    assert!(report.skipped_conflicts.is_empty());
    assert!(report.holding_dir.is_none());
    assert_eq!(
        fs::read_to_string(owner.entry_path(&id("20240602"))).unwrap(),
        "two\n\nparagraphs"
    );

    // Nothing left behind next to the entries.
    let leftovers: Vec<_> = fs::read_dir(owner.root())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("restore-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_fs_backend_removes_only_empty_dirs() {
    let (dir, backend) = setup();
    let gopher = dir.path().join("gopher");
    backend.atomic_write(&gopher.join("notes.txt"), b"mine").unwrap();

    assert!(!backend.remove_empty_dir(&gopher).unwrap());
    assert_eq!(fs::read_to_string(gopher.join("notes.txt")).unwrap(), "mine");

    backend.remove_file(&gopher.join("notes.txt")).unwrap();
    assert!(backend.remove_empty_dir(&gopher).unwrap());
    assert!(!gopher.exists());
    assert!(!backend.remove_empty_dir(&gopher).unwrap());
}
