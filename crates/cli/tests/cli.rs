use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Config for one feed whose archive is a closed local port.
fn write_config(dir: &Path, window_hours: u32) -> std::path::PathBuf {
    let config = format!(
        r#"
timeout_ms = 2000
data_dir = "{data}"
output_dir = "{out}"

[[feeds]]
name = "radio"
archive_base = "http://127.0.0.1:9/radio/"
window_hours = {window_hours}

[feeds.filename]
prefix = "radio"

[feeds.display]
timezone = "America/Los_Angeles"
timestamp_format = "%m/%d/%Y %H:%M:%S"
"#,
        data = dir.join("data").display(),
        out = dir.join("www").display(),
    );
    let path = dir.join("scanroll.toml");
    fs::write(&path, config).expect("write config");
    path
}

fn scanroll() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("scanroll");
    cmd.env_remove("SCANROLL_CONFIG_FILE");
    cmd
}

#[test]
fn feeds_lists_resolved_paths() {
    let tmp = tempdir().expect("tempdir");
    let config = write_config(tmp.path(), 24);

    scanroll()
        .arg("--config")
        .arg(&config)
        .arg("feeds")
        .assert()
        .success()
        .stdout(predicate::str::contains("radio"))
        .stdout(predicate::str::contains("radio_cache.sqlite"))
        .stdout(predicate::str::contains("radio_last24h.txt"))
        .stdout(predicate::str::contains("radio_last24h_meta.json"));
}

#[test]
fn run_with_unreachable_archive_writes_empty_outputs() {
    let tmp = tempdir().expect("tempdir");
    let config = write_config(tmp.path(), 24);

    scanroll().arg("--config").arg(&config).arg("run").assert().success();

    let out = fs::read_to_string(tmp.path().join("www").join("radio_last24h.txt")).expect("read output");
    assert_eq!(out, "");

    let meta = fs::read_to_string(tmp.path().join("www").join("radio_last24h_meta.json")).expect("read meta");
    let meta: serde_json::Value = serde_json::from_str(&meta).expect("parse meta");
    assert_eq!(meta["lines"], 0);
    assert_eq!(meta["inserted_this_run"], 0);
    assert_eq!(meta["window_hours"], 24);
    assert!(meta["generated_utc"].as_str().expect("generated_utc").ends_with('Z'));

    assert!(tmp.path().join("data").join("radio_cache.sqlite").exists());
}

#[test]
fn run_twice_keeps_outputs_stable() {
    let tmp = tempdir().expect("tempdir");
    let config = write_config(tmp.path(), 6);

    scanroll().arg("--config").arg(&config).args(["run", "--feed", "radio"]).assert().success();
    scanroll().arg("--config").arg(&config).args(["run", "--feed", "radio"]).assert().success();

    let www = tmp.path().join("www");
    let mut names: Vec<_> = fs::read_dir(&www)
        .expect("read www")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["radio_last6h.txt", "radio_last6h_meta.json"]);
}

#[test]
fn run_unknown_feed_fails() {
    let tmp = tempdir().expect("tempdir");
    let config = write_config(tmp.path(), 24);

    scanroll()
        .arg("--config")
        .arg(&config)
        .args(["run", "--feed", "law9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("law9"));
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = tempdir().expect("tempdir");
    let config = write_config(tmp.path(), 0);

    scanroll()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_hours"));

    assert!(!tmp.path().join("www").exists());
}

#[test]
fn missing_config_file_is_rejected() {
    let tmp = tempdir().expect("tempdir");

    scanroll()
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .arg("feeds")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
