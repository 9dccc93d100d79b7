//! End-to-end tests for the `invgen` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn invgen(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("invgen").expect("invgen binary");
    cmd.arg("--dir").arg(dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, body: &str) {
    fs::write(dir.path().join("invgen.json"), body).expect("write config");
}

#[test]
fn init_then_generate_renders_starter_inventory() {
    let dir = TempDir::new().unwrap();
    invgen(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("invgen.json"));

    fs::write(
        dir.path().join("app.txt.tmpl"),
        "{{ AppName }} x{{ Replicas | multiply(b=2) }}\n",
    )
    .unwrap();
    invgen(&dir)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("app.txt"));

    assert_eq!(fs::read_to_string(dir.path().join("app.txt")).unwrap(), "my-app x4\n");
}

#[test]
fn init_refuses_existing_config() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "{}");
    invgen(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn custom_delimiters_and_env_from_process() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"{"inventory": {"Name": "svc"}, "delimiter": {"left": "[[", "right": "]]"}}"#,
    );
    fs::write(
        dir.path().join("chart.yaml.tmpl"),
        "name: [[ .Name ]]\nimage: {{ .Values.image }}\ntoken: [[ getenvRequired(key=\"INVGEN_TEST_TOKEN\") ]]\n",
    )
    .unwrap();

    invgen(&dir)
        .env("INVGEN_TEST_TOKEN", "abc")
        .arg("generate")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("chart.yaml")).unwrap(),
        "name: svc\nimage: {{ .Values.image }}\ntoken: abc\n"
    );
}

#[test]
fn missing_key_fails_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{"inventory": {"KeyOne": "Value 1"}}"#);
    fs::write(dir.path().join("a.txt.tmpl"), "ok {{ KeyOne }}").unwrap();
    fs::write(dir.path().join("b.txt.tmpl"), "Test {{ .KeyTwo }} Content").unwrap();

    invgen(&dir)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("KeyTwo"));

    assert!(!dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
}

#[test]
fn missing_required_env_reports_function_error() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "{}");
    fs::write(
        dir.path().join("env.tmpl"),
        "{{ getenvRequired(key=\"INVGEN_TEST_SURELY_UNSET\") }}",
    )
    .unwrap();

    invgen(&dir)
        .env_remove("INVGEN_TEST_SURELY_UNSET")
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No environment variable value found for key: INVGEN_TEST_SURELY_UNSET",
        ));
}

#[test]
fn single_file_flag_limits_the_run() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{"inventory": {"X": 1}}"#);
    fs::write(dir.path().join("one.tmpl"), "{{ X }}").unwrap();
    fs::write(dir.path().join("two.tmpl"), "{{ X }}").unwrap();

    invgen(&dir)
        .args(["generate", "--file", "one.tmpl"])
        .assert()
        .success();

    assert!(dir.path().join("one").exists());
    assert!(!dir.path().join("two").exists());
}

#[test]
fn no_templates_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "{}");
    invgen(&dir)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no template file specified or found"));
}

#[test]
fn dry_run_reports_files_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "{}");
    fs::write(dir.path().join("plain.txt.tmpl"), "Test Content").unwrap();

    invgen(&dir)
        .args(["generate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("plain.txt"));

    assert!(!dir.path().join("plain.txt").exists(), "dry-run must not create files");
}

#[test]
fn diff_shows_pending_changes() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{"inventory": {"Port": 8080}}"#);
    fs::write(dir.path().join("server.conf.tmpl"), "port={{ Port }}\n").unwrap();
    fs::write(dir.path().join("server.conf"), "port=80\n").unwrap();

    invgen(&dir)
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("-port=80"))
        .stdout(predicate::str::contains("+port=8080"));

    invgen(&dir).arg("generate").assert().success();
    invgen(&dir)
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences."));
}

#[test]
fn explicit_config_path_is_honoured() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("alt.json");
    fs::write(&cfg, r#"{"inventory": {"Who": "alt"}}"#).unwrap();
    fs::write(dir.path().join("who.tmpl"), "{{ Who }}").unwrap();

    invgen(&dir)
        .arg("--config")
        .arg(&cfg)
        .arg("generate")
        .assert()
        .success();
    assert_eq!(fs::read_to_string(dir.path().join("who")).unwrap(), "alt");
}
