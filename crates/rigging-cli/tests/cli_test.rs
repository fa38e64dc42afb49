use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;

fn rigging(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rigging");
    cmd.env_remove("NODE_ENV")
        .env_remove("NODE_PATH")
        .args(["--config", dir.to_str().unwrap()]);
    cmd
}

fn init_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("rigging")
        .args(["init", dir.path().to_str().unwrap(), "--name", "demo"])
        .assert()
        .success();
    dir
}

#[test]
fn test_init_scaffolds_project() {
    let dir = init_project();

    assert!(dir.path().join("rigging.yaml").exists());
    assert!(dir.path().join("src/index.js").exists());
    assert!(dir.path().join("src/index.css").exists());
    assert!(dir.path().join("public/index.html").exists());

    // A second init refuses to overwrite
    cargo_bin_cmd!("rigging")
        .args(["init", dir.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_compose_development() {
    let dir = init_project();

    let output = rigging(dir.path()).arg("compose").output().unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["mode"], "development");
    assert_eq!(tree["bail"], false);
    assert_eq!(tree["output"]["filename"], "static/js/bundle.js");
}

#[test]
fn test_compose_production_from_node_env() {
    let dir = init_project();

    let output = rigging(dir.path())
        .env("NODE_ENV", "production")
        .arg("compose")
        .output()
        .unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["mode"], "production");
    assert_eq!(tree["bail"], true);
    assert_eq!(
        tree["output"]["filename"],
        "static/js/[name].[chunkhash:8].js"
    );
}

#[test]
fn test_compose_yaml() {
    let dir = init_project();

    rigging(dir.path())
        .args(["compose", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: development"));
}

#[test]
fn test_invalid_mode_fails() {
    let dir = init_project();

    rigging(dir.path())
        .args(["--mode", "staging", "compose"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    rigging(dir.path()).arg("validate").assert().failure();
}

#[test]
fn test_route_paths() {
    let dir = init_project();

    let output = rigging(dir.path())
        .args([
            "route",
            "src/index.js",
            "src/index.css",
            "node_modules/lib/index.js",
            "src/logo.svg",
            "public/data.json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let routes: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(routes.len(), 5);
    assert_eq!(routes[0]["route"], "scripts/babel-app");
    assert_eq!(routes[0]["pre"][0], "linter");
    assert_eq!(routes[1]["route"], "styles/css");
    assert_eq!(routes[1]["tools"][0], "style");
    assert_eq!(routes[2]["route"], "scripts/babel-modules");
    assert_eq!(routes[3]["route"], "default");
    assert_eq!(routes[4]["route"], "native");
}

#[test]
fn test_route_parent_segments_leave_app_src() {
    let dir = init_project();

    let output = rigging(dir.path())
        .args(["route", "src/../vendor/lib.js"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let route: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(route["path"], "src/../vendor/lib.js");
    assert_eq!(route["route"], "scripts/babel-modules");
    assert_eq!(route["pre"], serde_json::json!([]));
}

#[test]
fn test_route_async_stylesheet_in_production() {
    let dir = init_project();

    let initial = rigging(dir.path())
        .args(["--mode", "production", "route", "src/index.css"])
        .output()
        .unwrap();
    let initial: serde_json::Value = serde_json::from_slice(&initial.stdout).unwrap();
    assert_eq!(initial["tools"][0], "extract-css");

    let deferred = rigging(dir.path())
        .args(["--mode", "production", "route", "--async", "src/index.css"])
        .output()
        .unwrap();
    let deferred: serde_json::Value = serde_json::from_slice(&deferred.stdout).unwrap();
    assert_eq!(deferred["tools"][0], "style");
}

#[test]
fn test_scan_counts_routes() {
    let dir = init_project();
    std::fs::write(dir.path().join("src/logo.png"), [0u8; 4]).unwrap();

    rigging(dir.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("scripts/babel-app"))
        .stdout(predicate::str::contains("styles/css"))
        .stdout(predicate::str::contains("media/url"));
}

#[test]
fn test_validate_prints_stable_fingerprint() {
    let dir = init_project();

    let first = rigging(dir.path()).arg("validate").output().unwrap();
    let second = rigging(dir.path()).arg("validate").output().unwrap();
    assert!(first.status.success());

    let fingerprint = String::from_utf8(first.stdout.clone()).unwrap();
    assert_eq!(fingerprint.trim().len(), 64);
    assert_eq!(first.stdout.len(), second.stdout.len());
    assert_eq!(fingerprint, String::from_utf8(second.stdout).unwrap());
}

#[test]
fn test_html_interpolates_public_url() {
    let dir = init_project();

    rigging(dir.path())
        .args(["--mode", "production", "html"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"href="/favicon.ico""#))
        .stdout(predicate::str::contains("<title>demo</title>"));

    let out = dir.path().join("index.html");
    rigging(dir.path())
        .args(["html", "--output", out.to_str().unwrap()])
        .assert()
        .success();
    let html = std::fs::read_to_string(out).unwrap();
    assert!(html.contains(r#"href="/favicon.ico""#));
}
