use crate::error::{ImageError, Result};
use crate::reference::{check_domain, check_path};
use cnb_actions_core::{ActionsConfig, RegistryCredentials};
use regex::Regex;
use reqwest::header::{HeaderMap, LINK, WWW_AUTHENTICATE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Hosts that name Docker Hub but do not serve the registry API themselves
const DOCKER_HUB_ALIASES: &[&str] = &["docker.io", "index.docker.io", "registry.hub.docker.com"];
const DOCKER_HUB_API_HOST: &str = "registry-1.docker.io";

/// Page size requested from the tags endpoint
const TAGS_PAGE_SIZE: u32 = 1000;

static CHALLENGE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z][A-Za-z0-9_-]*)\s*=\s*"([^"]*)""#).expect("challenge regex is valid")
});

/// Source of repository tags.
///
/// Implemented by [`RegistryClient`]; tests substitute in-memory listings.
pub trait TagLister: Send + Sync {
    /// Return every tag of `domain/path`, following pagination to the end
    fn list_tags<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + 'a>>;
}

/// HTTP and credential settings for a [`RegistryClient`]
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    /// Credentials keyed by registry domain as written in references
    pub credentials: BTreeMap<String, RegistryCredentials>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::from_config(&ActionsConfig::default())
    }
}

impl RegistrySettings {
    /// Take HTTP limits and credentials from loaded configuration
    pub fn from_config(config: &ActionsConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.http.timeout_secs),
            max_redirects: config.http.max_redirects,
            user_agent: config.http.user_agent.clone(),
            credentials: config.registries.clone(),
        }
    }

    /// Add or replace credentials for `domain`
    pub fn with_credentials(mut self, domain: impl Into<String>, creds: RegistryCredentials) -> Self {
        self.credentials.insert(domain.into(), creds);
        self
    }
}

/// Client for the tag listing endpoint of OCI-compatible registries
pub struct RegistryClient {
    client: reqwest::Client,
    credentials: BTreeMap<String, RegistryCredentials>,
}

/// Authorization applied to requests within a single listing
#[derive(Debug, Clone)]
enum Auth {
    Anonymous,
    Bearer(String),
    Basic { username: String, password: String },
}

impl RegistryClient {
    /// Create a new registry client
    pub fn new(settings: RegistrySettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent)
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .build()
            .map_err(ImageError::HttpClient)?;

        Ok(Self {
            client,
            credentials: settings.credentials,
        })
    }

    /// List all tags for `path` on `domain` (handles auth challenges and pagination)
    pub async fn list_tags(&self, domain: &str, path: &str) -> Result<Vec<String>> {
        check_domain(domain).map_err(|reason| ImageError::InvalidRegistryDomain {
            domain: domain.to_string(),
            reason,
        })?;
        check_path(path).map_err(|reason| ImageError::InvalidRepositoryPath {
            path: path.to_string(),
            reason,
        })?;

        let fail = |message: String| ImageError::list(domain, path, message);

        let base = base_url(domain);
        let mut url = Url::parse(&format!(
            "{}/v2/{}/tags/list?n={}",
            base, path, TAGS_PAGE_SIZE
        ))
        .map_err(|e| fail(format!("invalid registry URL: {}", e)))?;

        let creds = self.credentials.get(domain);
        let mut auth = match creds.and_then(|c| c.token.as_ref()) {
            Some(token) => Auth::Bearer(token.clone()),
            None => Auth::Anonymous,
        };
        let mut challenged = false;
        let mut all_tags = Vec::new();
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(url.clone()) {
                return Err(fail(format!("pagination loop at {}", url)));
            }
            debug!("Listing tags from: {}", url);

            let mut response = self.send(self.client.get(url.clone()), &auth).await.map_err(&fail)?;

            if response.status() == StatusCode::UNAUTHORIZED && !challenged {
                challenged = true;
                auth = self
                    .answer_challenge(response.headers(), path, creds)
                    .await
                    .map_err(&fail)?;
                response = self.send(self.client.get(url.clone()), &auth).await.map_err(&fail)?;
            }

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(fail(format!(
                    "registry returned {} for {}: {}",
                    status,
                    url,
                    if body.trim().is_empty() {
                        "(no response body)".to_string()
                    } else {
                        body.trim().to_string()
                    }
                )));
            }

            let next_url = response
                .headers()
                .get(LINK)
                .and_then(|h| h.to_str().ok())
                .and_then(|link| parse_link_header(link, &url));

            let tags_response: TagsResponse = response
                .json()
                .await
                .map_err(|e| fail(format!("failed to parse tags response: {}", describe(&e))))?;

            all_tags.extend(tags_response.tags.unwrap_or_default());

            match next_url {
                Some(next) => url = next,
                None => break,
            }
        }

        trace!("Found {} tags total", all_tags.len());
        Ok(all_tags)
    }

    async fn send(&self, request: RequestBuilder, auth: &Auth) -> std::result::Result<Response, String> {
        let request = match auth {
            Auth::Anonymous => request,
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        };
        request.send().await.map_err(|e| describe(&e))
    }

    /// Turn a `401` challenge into credentials for the retried request
    async fn answer_challenge(
        &self,
        headers: &HeaderMap,
        path: &str,
        creds: Option<&RegistryCredentials>,
    ) -> std::result::Result<Auth, String> {
        let header = headers
            .get(WWW_AUTHENTICATE)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| "registry returned 401 Unauthorized without an auth challenge".to_string())?;

        let basic = creds.and_then(|c| match (&c.username, &c.password) {
            (Some(u), Some(p)) => Some((u.clone(), p.clone())),
            _ => None,
        });

        match parse_challenge(header) {
            Some(Challenge::Basic) => match basic {
                Some((username, password)) => Ok(Auth::Basic { username, password }),
                None => Err("registry requires basic auth but no credentials are configured".to_string()),
            },
            Some(Challenge::Bearer {
                realm,
                service,
                scope,
            }) => {
                let scope = scope.unwrap_or_else(|| format!("repository:{}:pull", path));
                let token = self
                    .fetch_token(&realm, service.as_deref(), &scope, basic)
                    .await?;
                Ok(Auth::Bearer(token))
            }
            None => Err(format!("unsupported auth challenge: {}", header)),
        }
    }

    /// Exchange credentials (or nothing, for public repositories) for a bearer token
    async fn fetch_token(
        &self,
        realm: &str,
        service: Option<&str>,
        scope: &str,
        basic: Option<(String, String)>,
    ) -> std::result::Result<String, String> {
        let mut token_url =
            Url::parse(realm).map_err(|e| format!("invalid auth realm {}: {}", realm, e))?;
        {
            let mut query = token_url.query_pairs_mut();
            if let Some(service) = service {
                query.append_pair("service", service);
            }
            query.append_pair("scope", scope);
        }

        debug!("Requesting registry token from: {}", token_url);

        let auth = match basic {
            Some((username, password)) => Auth::Basic { username, password },
            None => Auth::Anonymous,
        };
        let response = self.send(self.client.get(token_url.clone()), &auth).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "token request to {} failed ({}): {}",
                realm,
                status,
                body.trim()
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse token response: {}", describe(&e)))?;

        token
            .token
            .or(token.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| format!("token response from {} carried no token", realm))
    }
}

impl TagLister for RegistryClient {
    fn list_tags<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + 'a>> {
        Box::pin(RegistryClient::list_tags(self, domain, path))
    }
}

/// Scheme and API host for a registry domain.
///
/// Loopback and `.local` registries are spoken to over plain HTTP.
fn base_url(domain: &str) -> String {
    let host = if DOCKER_HUB_ALIASES.contains(&domain) {
        DOCKER_HUB_API_HOST
    } else {
        domain
    };
    let scheme = if is_insecure_host(host) { "http" } else { "https" };
    format!("{}://{}", scheme, host)
}

fn is_insecure_host(domain: &str) -> bool {
    let host = match domain.strip_prefix('[') {
        Some(rest) => rest.split(']').next().unwrap_or(rest),
        None => domain.split(':').next().unwrap_or(domain),
    };
    host == "localhost" || host == "127.0.0.1" || host == "::1" || host.ends_with(".local")
}

#[derive(Debug, PartialEq, Eq)]
enum Challenge {
    Basic,
    Bearer {
        realm: String,
        service: Option<String>,
        scope: Option<String>,
    },
}

/// Parse a `WWW-Authenticate` header.
/// Format: Bearer realm="https://auth.docker.io/token",service="registry.docker.io",scope="repository:x:pull"
fn parse_challenge(header: &str) -> Option<Challenge> {
    let header = header.trim();
    let (scheme, params) = header.split_once(' ').unwrap_or((header, ""));

    if scheme.eq_ignore_ascii_case("basic") {
        return Some(Challenge::Basic);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let mut realm = None;
    let mut service = None;
    let mut scope = None;
    for caps in CHALLENGE_PARAM_RE.captures_iter(params) {
        let value = caps[2].to_string();
        match caps[1].to_ascii_lowercase().as_str() {
            "realm" => realm = Some(value),
            "service" => service = Some(value),
            "scope" => scope = Some(value),
            _ => {}
        }
    }

    realm.map(|realm| Challenge::Bearer {
        realm,
        service,
        scope,
    })
}

/// Parse Link header for pagination
/// Format: </v2/repo/tags/list?n=100&last=tag>; rel="next"
fn parse_link_header(link: &str, current: &Url) -> Option<Url> {
    for part in link.split(',') {
        let part = part.trim();
        if part.contains("rel=\"next\"") {
            let start = part.find('<')?;
            let end = part.find('>')?;
            // relative links resolve against the page that returned them
            return current.join(&part[start + 1..end]).ok();
        }
    }
    None
}

/// Render an error with its source chain on one line
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}
