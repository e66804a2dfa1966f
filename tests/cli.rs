use assert_cmd::Command;
use predicates::prelude::*;

const PROJECT: &str = "tests/fixtures/project";

fn envlayer() -> Command {
    let mut cmd = Command::cargo_bin("envlayer").unwrap();
    cmd.env_remove("ENVLAYER_ENV").env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_version() {
    envlayer()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("envlayer"));
}

#[test]
fn cli_help() {
    envlayer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("per-environment overrides"));
}

#[test]
fn cli_resolve_dev() {
    envlayer()
        .args(["-d", PROJECT, "resolve", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("help_improve_mage: false"))
        .stdout(predicate::str::contains("global_hooks: true"))
        .stdout(predicate::str::contains("overrides").not());
}

#[test]
fn cli_resolve_reads_environment_variable() {
    envlayer()
        .env("ENVLAYER_ENV", "dev")
        .args(["-d", PROJECT, "get", "features.automatic_kernel_cleanup"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn cli_get_without_environment_returns_base_value() {
    envlayer()
        .args(["-d", PROJECT, "get", "features.automatic_kernel_cleanup"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn cli_get_subtree_as_json() {
    envlayer()
        .args(["-d", PROJECT, "get", "pipelines.settings", "-o", "json", "-e", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"save_in_code_automatically\": false"));
}

#[test]
fn cli_get_missing_path_fails() {
    envlayer()
        .args(["-d", PROJECT, "get", "does.not.exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no value at"));
}

#[test]
fn cli_envs_lists_environments() {
    envlayer()
        .args(["-d", PROJECT, "envs"])
        .assert()
        .success()
        .stdout("dev\nstaging\n");
}

#[test]
fn cli_diff_shows_changes() {
    envlayer()
        .args(["-d", PROJECT, "diff", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-help_improve_mage: true"))
        .stdout(predicate::str::contains("+help_improve_mage: false"));
}

#[test]
fn cli_diff_warns_about_unknown_environment() {
    envlayer()
        .args(["-d", PROJECT, "diff", "--env", "prod"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no overrides defined"));
}

#[test]
fn cli_check_valid_config() {
    envlayer()
        .args(["-d", PROJECT, "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"))
        .stdout(predicate::str::contains("dev, staging"));
}

#[test]
fn cli_check_invalid_overrides() {
    envlayer()
        .args(["-d", "tests/fixtures/broken", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("`overrides` must be a mapping"));
}

#[test]
fn cli_check_missing_config() {
    let empty = tempfile::TempDir::new().unwrap();
    envlayer()
        .args(["-d", empty.path().to_str().unwrap(), "check"])
        .assert()
        .failure();
}

#[test]
fn cli_resolve_toml_file() {
    envlayer()
        .args([
            "-f",
            "tests/fixtures/toml_project/metadata.toml",
            "resolve",
            "-e",
            "dev",
            "-o",
            "toml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 3000"));
}

#[test]
fn cli_completions() {
    envlayer()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("envlayer"));
}
