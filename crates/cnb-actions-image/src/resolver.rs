use crate::error::{ImageError, Result};
use crate::reference::ImageReference;
use crate::registry::{RegistryClient, TagLister};
use cnb_actions_core::TagScanMode;
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Loose check applied before strict semver parsing
static VERSION_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("version regex is valid"));

/// Resolves the latest semver tag of a repository
pub struct VersionResolver<L = RegistryClient> {
    lister: L,
    scan: TagScanMode,
}

impl<L: TagLister> VersionResolver<L> {
    /// Create a new version resolver
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            scan: TagScanMode::default(),
        }
    }

    /// Choose how non version-like tags are treated
    pub fn with_scan_mode(mut self, scan: TagScanMode) -> Self {
        self.scan = scan;
        self
    }

    pub fn scan_mode(&self) -> TagScanMode {
        self.scan
    }

    /// The tag source this resolver queries
    pub fn lister(&self) -> &L {
        &self.lister
    }

    /// Resolve the highest version of `reference`'s repository.
    ///
    /// The reference's tag is ignored. When `tag_suffix` is non-empty only
    /// tags ending in it are considered, and it is re-appended to the result.
    ///
    /// # Returns
    /// `<major>.<minor>.<patch>[-pre][+build]<tag_suffix>`
    pub async fn latest_version(&self, reference: &ImageReference, tag_suffix: &str) -> Result<String> {
        debug!(
            "Resolving latest version for {}: tag_suffix={:?}, scan={:?}",
            reference.repository(),
            tag_suffix,
            self.scan
        );

        let tags = self
            .lister
            .list_tags(&reference.domain, &reference.path)
            .await?;

        trace!("Found {} tags total", tags.len());

        let latest = select_latest(&tags, tag_suffix, self.scan)?.ok_or_else(|| {
            ImageError::NoMatchingVersions {
                repository: reference.repository(),
                tag_suffix: tag_suffix.to_string(),
            }
        })?;

        let resolved = format!("{}{}", latest, tag_suffix);
        debug!("Resolved {} to {}", reference.repository(), resolved);
        Ok(resolved)
    }

    /// Resolve and return `reference` re-tagged with the latest version
    pub async fn latest_tagged(&self, reference: &ImageReference, tag_suffix: &str) -> Result<ImageReference> {
        let version = self.latest_version(reference, tag_suffix).await?;
        Ok(reference.with_tag(version))
    }

    /// Parse `reference` and resolve its latest version
    pub async fn latest_version_of(&self, reference: &str, tag_suffix: &str) -> Result<String> {
        let reference = ImageReference::parse(reference)?;
        self.latest_version(&reference, tag_suffix).await
    }
}

/// Pick the highest version among `tags`.
///
/// Tags not ending in a non-empty `tag_suffix` are dropped and the suffix is
/// stripped from the rest. A candidate without an `X.Y.Z` run either ends
/// the scan or is skipped, depending on `scan`. A candidate with such a run
/// that still fails strict parsing is an error. A single leading `v` is
/// accepted.
///
/// Returns `Ok(None)` when nothing qualifies.
pub fn select_latest(tags: &[String], tag_suffix: &str, scan: TagScanMode) -> Result<Option<Version>> {
    let mut versions = Vec::new();

    for tag in tags {
        let candidate = if tag_suffix.is_empty() {
            tag.as_str()
        } else {
            match tag.strip_suffix(tag_suffix) {
                Some(stripped) => stripped,
                None => continue,
            }
        };

        if !VERSION_LIKE_RE.is_match(candidate) {
            match scan {
                TagScanMode::StopAtFirstNonVersion => {
                    trace!("Stopping scan at non-version tag: {}", tag);
                    break;
                }
                TagScanMode::SkipNonVersions => {
                    trace!("Skipping non-version tag: {}", tag);
                    continue;
                }
            }
        }

        let version_str = candidate.strip_prefix('v').unwrap_or(candidate);
        let version = Version::parse(version_str).map_err(|source| ImageError::InvalidSemver {
            tag: candidate.to_string(),
            source,
        })?;

        versions.push(version);
    }

    versions.sort();
    Ok(versions.pop())
}
