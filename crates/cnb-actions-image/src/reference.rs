use crate::error::{ImageError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Tag used when a reference does not name one
pub const DEFAULT_TAG: &str = "latest";

/// Registry assumed for references that do not name one
const DOCKER_HUB_DOMAIN: &str = "docker.io";
const DOCKER_HUB_NAMESPACE: &str = "library";

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[[0-9A-Fa-f:]+\]|[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*)(?::[0-9]+)?$",
    )
    .expect("domain regex is valid")
});

static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*(?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*$")
        .expect("path regex is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("tag regex is valid"));

/// Container image reference: registry domain, repository path and tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    /// Registry host, optionally with a port (e.g. "gcr.io", "localhost:8788")
    pub domain: String,
    /// Repository path within the registry (e.g. "some-repo/some-image")
    pub path: String,
    /// Tag, "latest" when the input did not carry one
    pub tag: String,
}

impl ImageReference {
    /// Build a reference from parts, tagged "latest".
    ///
    /// No validation happens here; the registry client checks domain and path
    /// before it talks to the network.
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
            tag: DEFAULT_TAG.to_string(),
        }
    }

    /// Return a copy of this reference carrying `tag`
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self {
            domain: self.domain.clone(),
            path: self.path.clone(),
            tag: tag.into(),
        }
    }

    /// Parse `registry/path` or `registry/path:tag`.
    ///
    /// The registry may carry a port; a colon is only treated as a tag
    /// separator when no `/` follows it.
    pub fn parse(s: &str) -> Result<Self> {
        let (domain, path, tag) = split_reference(s)?;
        let tag = match tag {
            Some(tag) => {
                if !TAG_RE.is_match(tag) {
                    return Err(ImageError::malformed(
                        s,
                        format!("invalid reference format: invalid tag {:?}", tag),
                    ));
                }
                tag.to_string()
            }
            None => DEFAULT_TAG.to_string(),
        };

        Ok(Self {
            domain: domain.to_string(),
            path: path.to_string(),
            tag,
        })
    }

    /// Parse a reference that must not carry a tag (build/run images, mirrors)
    pub fn parse_untagged(s: &str) -> Result<Self> {
        if tag_split(s).1.is_some() {
            return Err(ImageError::AmbiguousTag {
                reference: s.to_string(),
            });
        }
        Self::parse(s)
    }

    /// Parse with Docker-style name normalization.
    ///
    /// The first segment is a registry only when it contains `.` or `:` or is
    /// `localhost`. Otherwise the reference lives on `docker.io`, and a
    /// single-component path gains the `library/` namespace, so
    /// `paketobuildpacks/run:full-cnb` becomes
    /// `docker.io/paketobuildpacks/run:full-cnb`.
    pub fn parse_normalized(s: &str) -> Result<Self> {
        let (remainder, _) = tag_split(s);
        let names_registry = match remainder.split_once('/') {
            Some((first, _)) => first.contains(['.', ':']) || first == "localhost",
            None => false,
        };

        if names_registry {
            return Self::parse(s);
        }
        if remainder.is_empty() {
            return Err(ImageError::malformed(s, "invalid reference format: repository name is empty"));
        }

        let qualified = if remainder.contains('/') {
            format!("{}/{}", DOCKER_HUB_DOMAIN, s)
        } else {
            format!("{}/{}/{}", DOCKER_HUB_DOMAIN, DOCKER_HUB_NAMESPACE, s)
        };

        Self::parse(&qualified).map_err(|e| match e {
            ImageError::MalformedReference { reason, .. } => ImageError::malformed(s, reason),
            other => other,
        })
    }

    /// Canonical `domain/path:tag` rendering
    pub fn name(&self) -> String {
        format!("{}/{}:{}", self.domain, self.path, self.tag)
    }

    /// `domain/path` without the tag
    pub fn repository(&self) -> String {
        format!("{}/{}", self.domain, self.path)
    }
}

impl FromStr for ImageReference {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.domain, self.path, self.tag)
    }
}

/// Separate a trailing `:tag` from the rest of the reference
fn tag_split(s: &str) -> (&str, Option<&str>) {
    match s.rfind(':') {
        Some(idx) if !s[idx + 1..].contains('/') => (&s[..idx], Some(&s[idx + 1..])),
        _ => (s, None),
    }
}

fn split_reference(s: &str) -> Result<(&str, &str, Option<&str>)> {
    let (remainder, tag) = tag_split(s);

    let Some((domain, path)) = remainder.split_once('/') else {
        return Err(ImageError::malformed(
            s,
            "image should be in form <registry>/<repo>/<image>",
        ));
    };

    check_domain(domain)
        .and_then(|_| check_path(path))
        .map_err(|reason| ImageError::malformed(s, format!("invalid reference format: {}", reason)))?;

    Ok((domain, path, tag))
}

/// Check a registry domain against the `host[:port]` grammar
pub(crate) fn check_domain(domain: &str) -> std::result::Result<(), String> {
    if domain.is_empty() {
        return Err("registry domain is empty".to_string());
    }
    if !DOMAIN_RE.is_match(domain) {
        return Err(format!("registry domain {:?} is not a valid host[:port]", domain));
    }
    Ok(())
}

/// Check a repository path against the registry path grammar
pub(crate) fn check_path(path: &str) -> std::result::Result<(), String> {
    if path.is_empty() {
        return Err("repository path is empty".to_string());
    }
    if !PATH_RE.is_match(path) {
        return Err(format!(
            "repository path {:?} must be lowercase alphanumeric components separated by '/'",
            path
        ));
    }
    Ok(())
}
