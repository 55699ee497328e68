//! CLI command implementations

pub mod builder;
pub mod image;
pub mod version;

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use cnb_actions_core::{ActionsConfig, RegistryCredentials, TagScanMode};
use cnb_actions_image::{RegistryClient, RegistrySettings, VersionResolver};
use tracing::debug;

/// Load configuration and apply command-line overrides
pub fn load_config(global: &GlobalArgs) -> Result<ActionsConfig> {
    let mut config = ActionsConfig::load(global.config.as_deref())
        .context("Failed to load configuration")?;

    if global.skip_non_version_tags {
        config.tags.scan = TagScanMode::SkipNonVersions;
    }

    Ok(config)
}

/// Build a resolver whose credentials cover `domain`.
///
/// Credentials given on the command line replace any configured for that
/// domain; other configured registries keep theirs.
pub fn build_resolver(config: &ActionsConfig, global: &GlobalArgs, domain: &str) -> Result<VersionResolver> {
    let mut settings = RegistrySettings::from_config(config);

    match registry_credentials(config, global, domain) {
        Some(creds) => settings = settings.with_credentials(domain, creds),
        None => debug!("No credentials for {}, listing anonymously", domain),
    }

    let client = RegistryClient::new(settings).context("Failed to create registry client")?;
    Ok(VersionResolver::new(client).with_scan_mode(config.tags.scan))
}

/// Credentials for `domain`: command-line flags first, then configuration
fn registry_credentials(config: &ActionsConfig, global: &GlobalArgs, domain: &str) -> Option<RegistryCredentials> {
    if let Some(creds) = cli_credentials(global) {
        debug!("Using command-line credentials for {}", domain);
        return Some(creds);
    }

    let configured = config.credentials_for(domain).cloned();
    if configured.is_some() {
        debug!("Using configured credentials for {}", domain);
    }
    configured
}

fn cli_credentials(global: &GlobalArgs) -> Option<RegistryCredentials> {
    if let Some(token) = &global.registry_token {
        return Some(RegistryCredentials::token(token));
    }

    match (&global.registry_username, &global.registry_password) {
        (Some(username), Some(password)) => Some(RegistryCredentials::basic(username, password)),
        _ => None,
    }
}
