//! Image commands

use super::{build_resolver, load_config};
use crate::cli::{GlobalArgs, ImageCommands, LatestVersionArgs};
use anyhow::{Context, Result};
use cnb_actions_image::ImageReference;
use serde::Serialize;
use tracing::info;

/// Execute image command
pub async fn execute(cmd: ImageCommands, global: &GlobalArgs) -> Result<()> {
    match cmd {
        ImageCommands::LatestVersion(args) => latest_version(args, global).await,
    }
}

#[derive(Debug, Serialize)]
struct LatestVersionReport {
    repository: String,
    tag_suffix: String,
    version: String,
    image: String,
}

/// Resolve and print the latest version of a repository
async fn latest_version(args: LatestVersionArgs, global: &GlobalArgs) -> Result<()> {
    let reference = ImageReference::parse(&args.reference)
        .with_context(|| format!("Invalid image reference {}", args.reference))?;

    let config = load_config(global)?;
    let resolver = build_resolver(&config, global, &reference.domain)?;

    let tagged = resolver
        .latest_tagged(&reference, &args.tag_suffix)
        .await
        .with_context(|| format!("Failed to resolve latest version of {}", reference.repository()))?;

    info!("Latest version of {} is {}", reference.repository(), tagged.tag);

    if args.json {
        let report = LatestVersionReport {
            repository: reference.repository(),
            tag_suffix: args.tag_suffix,
            version: tagged.tag.clone(),
            image: tagged.name(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", tagged.tag);
    }

    Ok(())
}
