//! Common test infrastructure for cnb-actions-builder tests

#![allow(dead_code)]

use cnb_actions_image::{ImageReference, RegistryClient, RegistrySettings, VersionResolver};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ORDER_TOML: &str = r#"
description = "Some Description"

[[order]]
  [[order.group]]
  id = "some-repo/some-buildpack-2"

[[order]]
  [[order.group]]
  id = "some-repo/some-buildpack-1"
  homepage = "https://example.com/buildpack-1"

  [[order.group]]
  id = "some-repo/some-buildpack-2"
  optional = true
"#;

/// Registry domain (`127.0.0.1:<port>`) for a mock server
pub fn domain(server: &MockServer) -> String {
    server.address().to_string()
}

pub async fn mock_tags(server: &MockServer, repository: &str, tags: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/tags/list", repository)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": repository,
            "tags": tags,
        })))
        .mount(server)
        .await;
}

/// Serve buildpacks, a build image and a lifecycle image
pub async fn mock_builder_registry(server: &MockServer) {
    mock_tags(
        server,
        "some-repo/some-buildpack-1",
        &["0.0.10", "0.20.1", "0.20.12", "latest"],
    )
    .await;
    mock_tags(
        server,
        "some-repo/some-buildpack-2",
        &["0.0.10", "0.1.0", "0.20.2", "0.20.22"],
    )
    .await;
    mock_tags(
        server,
        "another-repo/some-build-image",
        &[
            "0.1.0",
            "0.20.2-some-stack-image-tag",
            "0.20.3-some-stack-image-tag",
            "0.40.2-different-stack-image-tag",
        ],
    )
    .await;
    mock_tags(
        server,
        "buildpacksio/lifecycle",
        &["0.9.0", "0.9.3", "0.10.2"],
    )
    .await;
}

/// Lifecycle image served by the mock registry
pub fn lifecycle_image(server: &MockServer) -> ImageReference {
    ImageReference::new(domain(server), "buildpacksio/lifecycle")
}

pub fn default_resolver() -> VersionResolver {
    let client = RegistryClient::new(RegistrySettings::default()).expect("client builds");
    VersionResolver::new(client)
}
