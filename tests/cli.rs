use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn feels(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("feels").unwrap();
    cmd.env_remove("FEELS_USERS_FILE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--home")
        .arg(home)
        .arg("--user")
        .arg("tester");
    cmd
}

#[test]
fn test_write_list_show() {
    let temp_dir = tempfile::tempdir().unwrap();
    let home = temp_dir.path();

    feels(home)
        .args(["write", "--date", "20240603", "a good day"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded"));

    feels(home)
        .args(["write", "--date", "20240603"])
        .write_stdin("and a good night\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added to"));

    feels(home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("03 June 2024"));

    feels(home)
        .args(["show", "20240603"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a good day\n\nand a good night"));

    assert!(home.join(".feels/entries/20240603.txt").is_file());
}

#[test]
fn test_list_json_reports_visibility() {
    let temp_dir = tempfile::tempdir().unwrap();
    let home = temp_dir.path();

    feels(home)
        .args(["write", "--date", "20240603", "quiet"])
        .assert()
        .success();
    feels(home).args(["nopub", "20240603"]).assert().success();

    let output = feels(home).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["id"], "20240603");
    assert_eq!(rows[0]["visibility"], "private");
    assert_eq!(rows[0]["word_count"], 1);
}

#[test]
fn test_invalid_date_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    feels(temp_dir.path())
        .args(["write", "--date", "20240230", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("20240230"));
}

#[test]
fn test_delete_needs_confirmation() {
    let temp_dir = tempfile::tempdir().unwrap();
    let home = temp_dir.path();
    feels(home)
        .args(["write", "--date", "20240603", "x"])
        .assert()
        .success();

    feels(home)
        .args(["delete", "20240603"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert!(home.join(".feels/entries/20240603.txt").exists());

    feels(home)
        .args(["bury", "20240603", "--yes"])
        .assert()
        .success();
    assert!(!home.join(".feels/entries/20240603.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_publishing_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let home = temp_dir.path();
    feels(home)
        .args(["write", "--date", "20240603", "*published* words"])
        .assert()
        .success();

    feels(home)
        .args(["publishing", "on", "--dir", "blog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published"));
    feels(home).args(["channel", "atom", "on"]).assert().success();

    let index = std::fs::read_to_string(home.join("public_html/blog/index.html")).unwrap();
    assert!(index.contains("<em>published</em>"));
    assert!(home.join(".feels/www/atom.xml").is_file());
    assert!(home.join(".feels/config/feels.toml").is_file());

    feels(home).args(["publishing", "off"]).assert().success();
    assert!(!home.join("public_html/blog").exists());
    assert!(!home.join(".feels/www").exists());
}

#[test]
fn test_backup_and_restore() {
    let temp_dir = tempfile::tempdir().unwrap();
    let home = temp_dir.path();
    feels(home)
        .args(["write", "--date", "20240603", "keep me"])
        .assert()
        .success();

    feels(home)
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("feels-tester-"));

    let backups = home.join(".feels/backups");
    let archive = std::fs::read_dir(&backups)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();

    feels(home)
        .args(["delete", "20240603", "--yes"])
        .assert()
        .success();
    feels(home)
        .arg("restore")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 1 entries"));
    assert_eq!(
        std::fs::read_to_string(home.join(".feels/entries/20240603.txt")).unwrap(),
        "keep me"
    );
}

#[test]
fn test_feed_across_users() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    let today = chrono::Local::now().format("%Y%m%d").to_string();

    for user in ["alice", "bob"] {
        let mut cmd = Command::cargo_bin("feels").unwrap();
        cmd.env_remove("FEELS_USERS_FILE")
            .env("NO_COLOR", "1")
            .arg("--home")
            .arg(root.join(user))
            .args(["write", "--date", &today, &format!("{} was here", user)])
            .assert()
            .success();
    }
    let users_file = root.join("users.txt");
    std::fs::write(&users_file, "alice\nbob\n").unwrap();

    let output = Command::cargo_bin("feels")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--home")
        .arg(root.join("alice"))
        .arg("--users-file")
        .arg(&users_file)
        .args(["feed", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let owners: Vec<_> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["owner"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(owners.len(), 2);
    assert!(owners.contains(&"alice".to_string()));
    assert!(owners.contains(&"bob".to_string()));
}

#[test]
fn test_neighbors_and_browse() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    let write = |user: &str, day: &str, text: &str| {
        Command::cargo_bin("feels")
            .unwrap()
            .env_remove("FEELS_USERS_FILE")
            .env("NO_COLOR", "1")
            .arg("--home")
            .arg(root.join(user))
            .args(["write", "--date", day, text])
            .assert()
            .success();
    };
    write("bob", "20240601", "open to all");
    write("bob", "20240602", "just for me");
    Command::cargo_bin("feels")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--home")
        .arg(root.join("bob"))
        .args(["nopub", "20240602"])
        .assert()
        .success();
    let users_file = root.join("users.txt");
    std::fs::write(&users_file, "alice\nbob\n").unwrap();

    let as_alice = || {
        let mut cmd = Command::cargo_bin("feels").unwrap();
        cmd.env("NO_COLOR", "1")
            .arg("--home")
            .arg(root.join("alice"))
            .arg("--users-file")
            .arg(&users_file);
        cmd
    };

    let output = as_alice().args(["neighbors", "--json"]).output().unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["name"], "bob");
    assert_eq!(rows[0]["entry_count"], 1);
    assert_eq!(rows[1]["name"], "alice");
    assert!(rows[1]["last_modified"].is_null());

    as_alice()
        .args(["browse", "~bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("01 June 2024"))
        .stdout(predicate::str::contains("02 June 2024").not());
    as_alice()
        .args(["browse", "bob", "20240601"])
        .assert()
        .success()
        .stdout(predicate::str::contains("open to all"));
    as_alice()
        .args(["browse", "bob", "20240602"])
        .assert()
        .failure();
    as_alice().args(["browse", "carol"]).assert().failure();
}
