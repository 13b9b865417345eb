//! Failures exit 1 with a message and suggestions on stderr.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("defai-element").unwrap();
    cmd.current_dir(workdir)
        .env_remove("DEFAI_API_KEY")
        .env_remove("DEFAI_API_URL")
        .env_remove("DEFAI_PASSWORD")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(workdir.join("config.json"));
    cmd
}

#[test]
fn unknown_verb_exits_1() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .arg("frobnicate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn bad_flag_value_exits_1() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["create", "my-widget", "--tier", "platinum"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("titanium"));
}

#[test]
fn invalid_element_name() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["--yes", "create", "My--App", "--skip-install"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid element name 'My--App'"))
        .stderr(predicate::str::contains("Suggestions"));
    assert!(!temp.path().join("My--App").exists());
}

#[test]
fn unknown_template_aborts_before_writing() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["--yes", "create", "my-widget", "--template", "svelte", "--skip-install"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("svelte"));
    assert!(!temp.path().join("my-widget").exists());
}

#[test]
fn validate_empty_directory_fails() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Validation failed"))
        .stderr(predicate::str::contains(
            "Missing required file: manifest.json",
        ));
}

#[test]
fn validate_missing_directory() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["validate", "--dir", "nowhere"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Project directory does not exist"));
}

#[test]
fn build_outside_a_project() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No manifest.json found"));
}

#[test]
fn publish_requires_login() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .arg("publish")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not logged in"))
        .stderr(predicate::str::contains("defai-element login"));
}

#[test]
fn stats_and_list_require_login() {
    let temp = TempDir::new().unwrap();
    for verb in ["stats", "list"] {
        cli(temp.path())
            .arg(verb)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Not logged in"));
    }
}

#[test]
fn login_without_email_in_a_script() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .arg("login")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn login_rejects_malformed_email() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["login", "--email", "ada-at-example", "--password", "pw"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a valid email"));
}

#[test]
fn config_rejects_unknown_keys() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["config", "--set", "colour=blue"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown config key 'colour'"));
}

#[test]
fn config_needs_exactly_one_action() {
    let temp = TempDir::new().unwrap();
    cli(temp.path()).arg("config").assert().code(1);
    cli(temp.path())
        .args(["config", "--list", "--path"])
        .assert()
        .code(1);
}

#[test]
fn malformed_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.json"), "{ nope").unwrap();
    cli(temp.path())
        .arg("info")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("Configuration error: Configuration error").not());
}

#[test]
fn malformed_config_file_can_still_be_reset() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    std::fs::write(&path, "{ nope").unwrap();

    cli(temp.path())
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));

    cli(temp.path())
        .args(["--yes", "config", "--reset"])
        .assert()
        .success();
    assert!(!path.exists());
}

#[test]
fn declined_reset_is_not_a_failure() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["config", "--set", "telemetry=false"])
        .assert()
        .success();
    cli(temp.path())
        .args(["config", "--reset"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Operation cancelled"));
    assert!(temp.path().join("config.json").exists());
}
