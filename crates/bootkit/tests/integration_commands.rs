//! Integration tests for run, init, and config subcommands

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn bootkit(temp: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("bootkit");
    cmd.env("BOOTKIT_HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env("XDG_DATA_HOME", temp.path().join("data"))
        .env("XDG_STATE_HOME", temp.path().join("state"))
        .env("XDG_CACHE_HOME", temp.path().join("cache"))
        .env_remove("BOOTKIT__PROFILE")
        .env_remove("BOOTKIT__RUNTIME__TIMEOUT")
        .env_remove("BOOTKIT__RUNTIME__PARALLELISM");
    cmd
}

fn config_file(temp: &TempDir) -> PathBuf {
    temp.path().join("config/bootkit/config.toml")
}

fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_run_human_output() {
    let temp = TempDir::new().unwrap();

    bootkit(&temp)
        .args(["run", "build", "--parallel", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Running task \"build\" with profile \"default\" (parallelism: 3, timeout: 60s)",
        ));
}

#[test]
fn test_run_json_output() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(config_file(&temp).parent().unwrap()).unwrap();
    fs::write(config_file(&temp), "profile = \"ci\"\n[runtime]\nparallelism = 4\n").unwrap();

    let stdout = stdout_of(bootkit(&temp).args(["--json", "run", "--timeout", "7"]));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(value["task"], "default");
    assert_eq!(value["profile"], "ci");
    assert_eq!(value["parallelism"], 4);
    assert_eq!(value["timeout"], 7);
}

#[test]
fn test_run_profile_flag_and_yaml() {
    let temp = TempDir::new().unwrap();

    let stdout = stdout_of(bootkit(&temp).args(["run", "deploy", "--profile", "prod", "--yaml"]));
    let value: serde_yaml::Value = serde_yaml::from_str(&stdout).unwrap();

    assert_eq!(value["task"].as_str(), Some("deploy"));
    assert_eq!(value["profile"].as_str(), Some("prod"));
    assert_eq!(value["timeout"].as_u64(), Some(60));
}

#[test]
fn test_init_on_fresh_home_succeeds() {
    let temp = TempDir::new().unwrap();

    bootkit(&temp).arg("init").assert().success();
    assert!(config_file(&temp).is_file());
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let temp = TempDir::new().unwrap();
    bootkit(&temp).arg("init").assert().success();
    fs::write(config_file(&temp), "profile = \"mine\"\n").unwrap();

    bootkit(&temp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(config_file(&temp)).unwrap(), "profile = \"mine\"\n");
}

#[test]
fn test_init_force_and_yes_overwrite() {
    let temp = TempDir::new().unwrap();
    bootkit(&temp).arg("init").assert().success();

    for args in [vec!["init", "--force"], vec!["-y", "init"]] {
        fs::write(config_file(&temp), "profile = \"mine\"\n").unwrap();
        bootkit(&temp)
            .args(&args)
            .assert()
            .success()
            .stderr(predicate::str::contains("wrote default config to"));

        let contents = fs::read_to_string(config_file(&temp)).unwrap();
        assert!(contents.starts_with("# Configuration for bootkit\n"), "{contents}");
    }
}

#[test]
fn test_init_force_dry_run_keeps_file() {
    let temp = TempDir::new().unwrap();
    bootkit(&temp).arg("init").assert().success();
    fs::write(config_file(&temp), "profile = \"mine\"\n").unwrap();

    bootkit(&temp)
        .args(["--dry-run", "init", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("dry-run: would write default config"));
    assert_eq!(fs::read_to_string(config_file(&temp)).unwrap(), "profile = \"mine\"\n");
}

#[test]
fn test_config_show_formats() {
    let temp = TempDir::new().unwrap();

    bootkit(&temp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile = \"default\""))
        .stdout(predicate::str::contains("[runtime]"));

    bootkit(&temp)
        .args(["config", "show", "--yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile: default"));
}

#[test]
fn test_config_paths_json() {
    let temp = TempDir::new().unwrap();

    let stdout = stdout_of(bootkit(&temp).args(["config", "paths", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let expect = |key: &str, rel: &str| {
        assert_eq!(
            value[key].as_str().map(PathBuf::from),
            Some(temp.path().join(rel)),
            "{key}"
        );
    };
    expect("config_file", "config/bootkit/config.toml");
    expect("data_dir", "data/bootkit");
    expect("state_dir", "state/bootkit");
    expect("cache_dir", "cache/bootkit");
}

#[test]
fn test_config_paths_follow_config_overrides() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(config_file(&temp).parent().unwrap()).unwrap();
    fs::write(
        config_file(&temp),
        "[paths]\ndata_dir = \"~/custom/data\"\nstate_dir = \"$BOOTKIT_TEST_STATE/state\"\n",
    )
    .unwrap();

    let stdout = stdout_of(
        bootkit(&temp)
            .env("BOOTKIT_TEST_STATE", temp.path().join("elsewhere"))
            .args(["config", "paths"]),
    );

    let data = temp.path().join("custom/data");
    let state = temp.path().join("elsewhere/state");
    assert!(stdout.contains(data.to_str().unwrap()), "{stdout}");
    assert!(stdout.contains(state.to_str().unwrap()), "{stdout}");
    assert!(data.is_dir());
    assert!(state.is_dir());
}

#[test]
fn test_config_schema_is_json() {
    let temp = TempDir::new().unwrap();

    let stdout = stdout_of(bootkit(&temp).args(["config", "schema"]));
    let schema: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(schema["$schema"], "https://json-schema.org/draft/2020-12/schema");
    assert_eq!(schema["properties"]["runtime"]["properties"]["timeout"]["default"], 60);
}

#[test]
fn test_config_reset_restores_template() {
    let temp = TempDir::new().unwrap();
    bootkit(&temp).arg("init").assert().success();
    let original = fs::read_to_string(config_file(&temp)).unwrap();
    fs::write(config_file(&temp), "profile = \"changed\"\n").unwrap();

    bootkit(&temp)
        .args(["--dry-run", "config", "reset"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(config_file(&temp)).unwrap(), "profile = \"changed\"\n");

    bootkit(&temp)
        .args(["config", "reset"])
        .assert()
        .success()
        .stderr(predicate::str::contains("reset config at"));
    assert_eq!(fs::read_to_string(config_file(&temp)).unwrap(), original);
}
