//! Configuration file loading and parsing

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["cnb-actions.yaml", "cnb-actions.yml"];

/// Default lifecycle image, versioned by plain semver tags
pub const DEFAULT_LIFECYCLE_IMAGE: &str = "index.docker.io/buildpacksio/lifecycle";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Top-level configuration for cnb-actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionsConfig {
    /// HTTP client settings used for registry requests
    #[serde(default)]
    pub http: HttpConfig,

    /// How registry tags are scanned during version resolution
    #[serde(default)]
    pub tags: TagsConfig,

    /// Lifecycle image settings
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Credentials keyed by registry domain (e.g. "gcr.io", "localhost:5000")
    #[serde(default)]
    pub registries: BTreeMap<String, RegistryCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn default_user_agent() -> String {
    format!("cnb-actions/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagsConfig {
    #[serde(default)]
    pub scan: TagScanMode,
}

/// Behaviour when a tag does not look like a version during a scan.
///
/// Tags are scanned in registry order. The default stops at the first tag
/// without an `X.Y.Z` run and ignores everything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TagScanMode {
    /// Stop at the first candidate that is not version-like
    #[default]
    StopAtFirstNonVersion,
    /// Skip non version-like candidates and keep scanning
    SkipNonVersions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfig {
    #[serde(default = "default_lifecycle_image")]
    pub image: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            image: default_lifecycle_image(),
        }
    }
}

fn default_lifecycle_image() -> String {
    DEFAULT_LIFECYCLE_IMAGE.to_string()
}

/// Credentials for a single registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryCredentials {
    /// Static bearer token sent with every request
    #[serde(default)]
    pub token: Option<String>,

    /// Username for token exchange against the registry's auth realm
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl RegistryCredentials {
    /// Credentials carrying only a static bearer token
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Username/password pair used for basic auth against a token realm
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            token: None,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

impl ActionsConfig {
    /// Load configuration from the specified path or search for it.
    ///
    /// An explicit path must exist. When no path is given and no config file
    /// is found in the working directory, defaults are used.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let (config_path, content) = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::config_not_found(p.as_str())
                    } else {
                        Error::Io(e)
                    }
                })?;
                (p.to_owned(), content)
            }
            None => match Self::find_config(Utf8Path::new("."))? {
                Some(found) => found,
                None => {
                    debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading configuration from {}", config_path);
        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ActionsConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search `dir` for one of the known config file names
    pub fn find_config(dir: &Utf8Path) -> Result<Option<(Utf8PathBuf, String)>> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                let content = fs::read_to_string(&candidate)?;
                return Ok(Some((candidate, content)));
            }
        }
        Ok(None)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_config("http.timeout_secs must be positive"));
        }

        if self.lifecycle.image.trim().is_empty() {
            return Err(Error::invalid_config("lifecycle.image must not be empty"));
        }

        for (domain, creds) in &self.registries {
            if domain.is_empty() {
                return Err(Error::invalid_config("registry domain must not be empty"));
            }
            if creds.username.is_some() != creds.password.is_some() {
                return Err(Error::invalid_config(format!(
                    "registries.{}: username and password must be set together",
                    domain
                )));
            }
        }

        Ok(())
    }

    /// Credentials configured for a registry domain
    pub fn credentials_for(&self, domain: &str) -> Option<&RegistryCredentials> {
        self.registries.get(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ActionsConfig::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.max_redirects, 10);
        assert!(config.http.user_agent.starts_with("cnb-actions/"));
        assert_eq!(config.tags.scan, TagScanMode::StopAtFirstNonVersion);
        assert_eq!(config.lifecycle.image, DEFAULT_LIFECYCLE_IMAGE);
        assert!(config.registries.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
http:
  timeout_secs: 5
  max_redirects: 3
tags:
  scan: skip-non-versions
lifecycle:
  image: localhost:5000/buildpacksio/lifecycle
registries:
  gcr.io:
    token: abc
  "localhost:5000":
    username: bot
    password: secret
"#;
        let config = ActionsConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_redirects, 3);
        assert_eq!(config.tags.scan, TagScanMode::SkipNonVersions);
        assert_eq!(config.lifecycle.image, "localhost:5000/buildpacksio/lifecycle");
        assert_eq!(
            config.credentials_for("gcr.io"),
            Some(&RegistryCredentials::token("abc"))
        );
        assert_eq!(
            config.credentials_for("localhost:5000"),
            Some(&RegistryCredentials::basic("bot", "secret"))
        );
        assert!(config.credentials_for("docker.io").is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = ActionsConfig::from_yaml_str("htp:\n  timeout_secs: 5\n");
        assert!(matches!(result, Err(Error::YamlParse(_))));
    }

    #[test]
    fn test_username_without_password_rejected() {
        let yaml = "registries:\n  gcr.io:\n    username: bot\n";
        let err = ActionsConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("registries.gcr.io"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ActionsConfig::from_yaml_str("http:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let err = ActionsConfig::load(Some(Utf8Path::new("/nonexistent/cnb-actions.yaml")))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("custom.yaml")).unwrap();
        fs::write(&path, "tags:\n  scan: skip-non-versions\n").unwrap();

        let config = ActionsConfig::load(Some(&path)).unwrap();
        assert_eq!(config.tags.scan, TagScanMode::SkipNonVersions);
    }

    #[test]
    fn test_find_config_prefers_yaml_extension() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("cnb-actions.yml"), "http:\n  timeout_secs: 7\n").unwrap();
        fs::write(root.join("cnb-actions.yaml"), "http:\n  timeout_secs: 9\n").unwrap();

        let (path, content) = ActionsConfig::find_config(&root).unwrap().unwrap();
        assert_eq!(path.file_name(), Some("cnb-actions.yaml"));
        assert!(content.contains("9"));
    }

    #[test]
    fn test_find_config_none() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        assert!(ActionsConfig::find_config(&root).unwrap().is_none());
    }
}
