//! Mock registry helpers
//!
//! Sets up wiremock endpoints that behave like the `/v2/<path>/tags/list`
//! API of an OCI registry.

use cnb_actions_image::{RegistryClient, RegistrySettings, VersionResolver};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const BUILDPACK_1_TAGS: &[&str] = &["0.0.10", "0.20.1", "0.20.12", "latest"];
pub const BUILDPACK_2_TAGS: &[&str] = &["0.0.10", "0.1.0", "0.20.2", "0.20.22"];
pub const BUILD_IMAGE_TAGS: &[&str] = &[
    "0.1.0",
    "0.20.2-some-stack-image-tag",
    "0.20.3-some-stack-image-tag",
    "0.40.2-different-stack-image-tag",
];

/// Matches requests that carry no Authorization header
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

/// Registry domain (`127.0.0.1:<port>`) for a mock server
pub fn domain(server: &MockServer) -> String {
    server.address().to_string()
}

/// Serve `tags` for `repository`
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

/// Serve the fixture repositories used by the builder actions
pub async fn mock_fixture_registry(server: &MockServer) {
    mock_tags(server, "some-repo/some-buildpack-1", BUILDPACK_1_TAGS).await;
    mock_tags(server, "some-repo/some-buildpack-2", BUILDPACK_2_TAGS).await;
    mock_tags(server, "another-repo/some-build-image", BUILD_IMAGE_TAGS).await;
}

/// Resolver backed by a real client with default settings
pub fn default_resolver() -> VersionResolver {
    let client = RegistryClient::new(RegistrySettings::default()).expect("client builds");
    VersionResolver::new(client)
}
