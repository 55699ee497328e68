//! Integration tests for the cnb-actions binary
//!
//! Runs the compiled CLI against a wiremock registry. Each test runs in its
//! own temp directory so no stray cnb-actions.yaml is picked up.

use serde_json::{json, Value};
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─── Helpers ───────────────────────────────────────────────────────────────

async fn mock_tags(server: &MockServer, repository: &str, tags: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/tags/list", repository)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": repository,
            "tags": tags,
        })))
        .mount(server)
        .await;
}

async fn fixture_registry() -> MockServer {
    let server = MockServer::start().await;
    mock_tags(&server, "some-repo/some-buildpack-1", &["0.0.10", "0.20.1", "0.20.12", "latest"]).await;
    mock_tags(&server, "some-repo/some-buildpack-2", &["0.0.10", "0.1.0", "0.20.2", "0.20.22"]).await;
    mock_tags(
        &server,
        "another-repo/some-build-image",
        &["0.1.0", "0.20.2-some-stack-image-tag", "0.20.3-some-stack-image-tag"],
    )
    .await;
    mock_tags(&server, "buildpacksio/lifecycle", &["0.9.0", "0.10.2"]).await;
    server
}

/// Run the binary in `dir` with a clean output environment
fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cnb-actions"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("GITHUB_OUTPUT")
        .env_remove("REGISTRY_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("binary runs")
}

fn write_lifecycle_config(dir: &TempDir, domain: &str) {
    fs::write(
        dir.path().join("cnb-actions.yaml"),
        format!("lifecycle:\n  image: {}/buildpacksio/lifecycle\n", domain),
    )
    .unwrap();
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_latest_version_prints_version() {
    let server = fixture_registry().await;
    let domain = server.address().to_string();
    let dir = TempDir::new().unwrap();

    let out = run(
        &dir,
        &["-q", "image", "latest-version", &format!("{}/some-repo/some-buildpack-1", domain)],
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "0.20.12");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_latest_version_json() {
    let server = fixture_registry().await;
    let domain = server.address().to_string();
    let dir = TempDir::new().unwrap();

    let out = run(
        &dir,
        &[
            "-q",
            "image",
            "latest-version",
            &format!("{}/another-repo/some-build-image", domain),
            "--tag-suffix",
            "-some-stack-image-tag",
            "--json",
        ],
    );

    assert!(out.status.success());
    let report: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["version"], "0.20.3-some-stack-image-tag");
    assert_eq!(
        report["image"],
        format!("{}/another-repo/some-build-image:0.20.3-some-stack-image-tag", domain)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_appends_github_output() {
    let server = fixture_registry().await;
    let domain = server.address().to_string();
    let dir = TempDir::new().unwrap();
    write_lifecycle_config(&dir, &domain);

    fs::write(
        dir.path().join("order.toml"),
        r#"
description = "Some Description"

[[order]]
  [[order.group]]
  id = "some-repo/some-buildpack-1"

  [[order.group]]
  id = "some-repo/some-buildpack-2"
"#,
    )
    .unwrap();
    let github_output = dir.path().join("github_output");
    fs::write(&github_output, "previous=value\n").unwrap();

    let out = run(
        &dir,
        &[
            "-q",
            "builder",
            "generate",
            "--stack",
            "some-stack-id",
            "--build-image",
            &format!("{}/another-repo/some-build-image", domain),
            "--run-image",
            &format!("{}/another-repo/some-run-image", domain),
            "--run-image-mirrors",
            &format!("{}/another-repo/mirror-1,{}/another-repo/mirror-2", domain, domain),
            "--stack-image-tag",
            "some-stack-image-tag",
            "--order-file",
            "order.toml",
            "--registry-server",
            &domain,
            "--github-output",
            github_output.to_str().unwrap(),
        ],
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let written = fs::read_to_string(&github_output).unwrap();
    assert!(written.starts_with("previous=value\nbuilder_toml<<"));
    assert!(written.contains("description = \"Some Description\""));
    assert!(written.contains(&format!(
        "build-image = \"{}/another-repo/some-build-image:0.20.3-some-stack-image-tag\"",
        domain
    )));
    assert!(written.contains(&format!("{}/another-repo/mirror-2:some-stack-image-tag", domain)));
    assert!(written.contains("version = \"0.10.2\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_prints_set_output_without_github_output() {
    let server = fixture_registry().await;
    let domain = server.address().to_string();
    let dir = TempDir::new().unwrap();
    write_lifecycle_config(&dir, &domain);

    fs::write(
        dir.path().join("builder.toml"),
        format!(
            r#"
description = "Some Description"

[lifecycle]
version = "0.9.0"

[[order]]
  [[order.group]]
  id = "some-repo/some-buildpack-2"
  version = "0.1.0"

[stack]
id = "some-stack-id"
build-image = "{domain}/another-repo/some-build-image:0.20.2-some-stack-image-tag"
run-image = "{domain}/another-repo/some-run-image:some-stack-image-tag"
"#
        ),
    )
    .unwrap();

    let out = run(
        &dir,
        &[
            "-q",
            "builder",
            "update",
            "--builder-file",
            "builder.toml",
            "--registry-server",
            &domain,
        ],
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("::set-output name=builder_toml::"));
    assert!(!stdout.trim_end().contains('\n'));
    assert!(stdout.contains("%0A"));
    assert!(stdout.contains("0.20.22"));
    assert!(stdout.contains("0.20.3-some-stack-image-tag"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failure_exits_non_zero_with_single_line_error() {
    let server = fixture_registry().await;
    let domain = server.address().to_string();
    let dir = TempDir::new().unwrap();

    let out = run(
        &dir,
        &["-q", "image", "latest-version", &format!("{}/some-repo/missing", domain)],
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.trim_end().lines().count(), 1);
    assert!(stderr.contains("some-repo/missing"));
    assert!(stderr.contains(&domain));
}

#[test]
fn test_malformed_reference_rejected() {
    let dir = TempDir::new().unwrap();
    let out = run(&dir, &["-q", "image", "latest-version", "just-an-image"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("just-an-image"));
}
