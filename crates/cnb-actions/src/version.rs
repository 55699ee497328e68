//! Version report for the cnb-actions CLI

use cnb_actions_core::{ActionsConfig, TagScanMode};
use serde::{Deserialize, Serialize};

/// Release version plus the resolution settings in effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionReport {
    pub version: String,

    /// Repository the lifecycle version is resolved from
    pub lifecycle_image: String,

    pub tag_scan: TagScanMode,

    /// User agent sent to registries
    pub user_agent: String,

    /// Registry domains with configured credentials
    pub authenticated_registries: Vec<String>,
}

impl VersionReport {
    pub fn from_config(config: &ActionsConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            lifecycle_image: config.lifecycle.image.clone(),
            tag_scan: config.tags.scan,
            user_agent: config.http.user_agent.clone(),
            authenticated_registries: config.registries.keys().cloned().collect(),
        }
    }

    pub fn headline(&self) -> String {
        format!("cnb-actions {}", self.version)
    }

    /// Human-readable scan mode, as written in config files
    pub fn tag_scan_name(&self) -> &'static str {
        match self.tag_scan {
            TagScanMode::StopAtFirstNonVersion => "stop-at-first-non-version",
            TagScanMode::SkipNonVersions => "skip-non-versions",
        }
    }
}
