//! Version command

use super::load_config;
use crate::cli::{GlobalArgs, VersionArgs};
use crate::output;
use crate::version::VersionReport;
use anyhow::Result;

/// Print the release version and the effective resolution settings
pub fn run(args: VersionArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let report = VersionReport::from_config(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.headline());
    output::kv("Lifecycle image", &report.lifecycle_image);
    output::kv("Tag scan", report.tag_scan_name());
    output::kv("User agent", &report.user_agent);
    if !report.authenticated_registries.is_empty() {
        output::kv("Credentials for", &report.authenticated_registries.join(", "));
    }

    Ok(())
}
