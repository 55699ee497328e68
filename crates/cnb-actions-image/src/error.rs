//! Error types for cnb-actions-image

use thiserror::Error;

/// Result type alias using cnb-actions-image's error type
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors raised while parsing references and resolving versions
#[derive(Error, Debug)]
pub enum ImageError {
    /// A tag was found on a reference that must not carry one
    #[error("image should not contain tag: {reference}")]
    AmbiguousTag { reference: String },

    /// The reference string does not have the expected shape
    #[error("invalid reference {reference:?}: {reason}")]
    MalformedReference { reference: String, reason: String },

    /// The registry domain is not a valid `host[:port]`
    #[error("invalid registry domain ({domain}): {reason}")]
    InvalidRegistryDomain { domain: String, reason: String },

    /// The repository path is not a valid registry path
    #[error("invalid repository path ({path}): {reason}")]
    InvalidRepositoryPath { path: String, reason: String },

    /// Listing tags failed (transport, auth, status or body)
    #[error("failed to list tags for repository {path} on domain {domain}: {message}")]
    RegistryList {
        domain: String,
        path: String,
        message: String,
    },

    /// No tag survived suffix filtering and version parsing
    #[error("no matching versions found for {repository} (tag suffix {tag_suffix:?})")]
    NoMatchingVersions {
        repository: String,
        tag_suffix: String,
    },

    /// A version-like tag failed strict semver parsing
    #[error("invalid semver version ({tag}): {source}")]
    InvalidSemver {
        tag: String,
        #[source]
        source: semver::Error,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ImageError {
    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn list(domain: &str, path: &str, message: impl Into<String>) -> Self {
        Self::RegistryList {
            domain: domain.to_string(),
            path: path.to_string(),
            message: message.into(),
        }
    }
}
