use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn watchlist(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_watchlist"))
        .arg("--config")
        .arg(config_dir.join("settings.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run watchlist")
}

fn make_dir(temp_dir: &TempDir, name: &str) -> PathBuf {
    let dir = temp_dir.path().join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir.canonicalize().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_add_list_remove_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    let demo = make_dir(&temp_dir, "demo");
    let demo_str = demo.to_str().unwrap();

    let output = watchlist(&config_dir, &["add", demo_str]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(&format!("Watching: {demo_str}")));

    // Persisted next to the settings file
    let store = std::fs::read_to_string(config_dir.join("watched.toml")).unwrap();
    assert!(store.contains(demo_str));

    // A fresh process sees the same list
    let output = watchlist(&config_dir, &["list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(&format!("  - {demo_str}")));

    let output = watchlist(&config_dir, &["remove", demo_str]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Stopped watching"));

    let output = watchlist(&config_dir, &["list"]);
    assert!(stdout(&output).contains("(none)"));
}

#[test]
fn test_duplicate_and_missing_exit_codes() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    let demo = make_dir(&temp_dir, "demo");
    let demo_str = demo.to_str().unwrap();

    assert!(watchlist(&config_dir, &["add", demo_str]).status.success());

    let output = watchlist(&config_dir, &["add", &format!("{demo_str}/")]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Already watched"));

    let missing = temp_dir.path().join("nonexistent/path");
    let output = watchlist(&config_dir, &["add", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(5));

    // Removing something that is not watched is not an error
    let output = watchlist(&config_dir, &["remove", missing.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Not watched"));
}

#[test]
fn test_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    let demo = make_dir(&temp_dir, "demo");
    let demo_str = demo.to_str().unwrap();

    let output = watchlist(&config_dir, &["--json", "add", demo_str]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"][0]["ok"], true);
    assert_eq!(value["data"][0]["path"], demo_str);

    let output = watchlist(&config_dir, &["--json", "add", demo_str]);
    assert_eq!(output.status.code(), Some(4));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["code"], "ALREADY_WATCHED");
    assert_eq!(value["data"][0]["kind"], "already_watched");

    let output = watchlist(&config_dir, &["list", "--json"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["data"], serde_json::json!([demo_str]));
    assert_eq!(value["meta"]["count"], 1);
}

#[test]
fn test_check_and_prune() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    let kept = make_dir(&temp_dir, "kept");
    let gone = make_dir(&temp_dir, "gone");

    let output = watchlist(
        &config_dir,
        &["add", kept.to_str().unwrap(), gone.to_str().unwrap()],
    );
    assert!(output.status.success());

    std::fs::remove_dir(&gone).unwrap();

    let output = watchlist(&config_dir, &["check"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).contains(gone.to_str().unwrap()));

    let output = watchlist(&config_dir, &["prune"]);
    assert!(output.status.success());

    let output = watchlist(&config_dir, &["--json", "list"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["data"], serde_json::json!([kept.to_str().unwrap()]));
}

#[test]
fn test_init_and_config_commands() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");

    let output = watchlist(&config_dir, &["init"]);
    assert!(output.status.success());
    let content = std::fs::read_to_string(config_dir.join("settings.toml")).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[registry]"));

    let output = watchlist(&config_dir, &["init"]);
    assert_eq!(output.status.code(), Some(2));

    std::fs::write(
        config_dir.join("settings.toml"),
        "version = 3\n[registry]\nstore_path = \"lists/folders.toml\"\n",
    )
    .unwrap();

    let output = watchlist(&config_dir, &["config"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("version = 3"));
    assert!(out.contains("folders.toml"));
}

#[test]
fn test_corrupt_store_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("watched.toml"), "paths = [oops").unwrap();

    let output = watchlist(&config_dir, &["list"]);
    assert_eq!(output.status.code(), Some(7));
    // The damaged file is left alone
    assert_eq!(
        std::fs::read_to_string(config_dir.join("watched.toml")).unwrap(),
        "paths = [oops"
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_directory_is_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    let latin1 = temp_dir.path().join(OsStr::from_bytes(b"caf\xe9"));
    std::fs::create_dir(&latin1).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_watchlist"))
        .arg("--config")
        .arg(config_dir.join("settings.toml"))
        .arg("add")
        .arg(&latin1)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run watchlist");
    assert_eq!(output.status.code(), Some(8));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not valid UTF-8"));
    assert!(!config_dir.join("watched.toml").exists());
}
