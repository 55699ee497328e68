//! Builder commands

use super::{build_resolver, load_config};
use crate::cli::{BuilderCommands, BuilderGenerateArgs, BuilderUpdateArgs, GlobalArgs, StepOutputArgs};
use crate::output;
use anyhow::{Context, Result};
use cnb_actions_builder::{BuilderFile, BuilderUpdater, GenerateInputs, OrderFile};
use cnb_actions_core::ActionOutput;
use cnb_actions_image::ImageReference;
use tracing::debug;

/// Execute builder command
pub async fn execute(cmd: BuilderCommands, global: &GlobalArgs) -> Result<()> {
    match cmd {
        BuilderCommands::Generate(args) => generate(args, global).await,
        BuilderCommands::Update(args) => update(args, global).await,
    }
}

async fn generate(args: BuilderGenerateArgs, global: &GlobalArgs) -> Result<()> {
    let order = OrderFile::load(&args.order_file)?;

    let config = load_config(global)?;
    let lifecycle = lifecycle_image(&config.lifecycle.image)?;
    let resolver = build_resolver(&config, global, &args.registry_server)?;
    let updater = BuilderUpdater::new(&resolver, &args.registry_server, lifecycle);

    let inputs = GenerateInputs {
        stack: args.stack,
        build_image: args.build_image,
        run_image: args.run_image,
        run_image_mirrors: split_mirrors(&args.run_image_mirrors),
        stack_image_tag: args.stack_image_tag,
        order,
    };

    let builder = updater.generate(inputs).await?;
    publish(&builder, &args.output)
}

async fn update(args: BuilderUpdateArgs, global: &GlobalArgs) -> Result<()> {
    let builder = BuilderFile::load(&args.builder_file)?;

    let config = load_config(global)?;
    let lifecycle = lifecycle_image(&config.lifecycle.image)?;
    let resolver = build_resolver(&config, global, &args.registry_server)?;
    let updater = BuilderUpdater::new(&resolver, &args.registry_server, lifecycle);

    let builder = updater.update(builder).await?;
    publish(&builder, &args.output)
}

fn lifecycle_image(image: &str) -> Result<ImageReference> {
    ImageReference::parse(image).with_context(|| format!("Invalid lifecycle image {}", image))
}

/// Encode the document and write it as a step output
fn publish(builder: &BuilderFile, args: &StepOutputArgs) -> Result<()> {
    let toml = builder.to_toml_string()?;
    debug!("Generated builder.toml:\n{}", toml);

    let target = ActionOutput::from_path(args.github_output.clone());
    target
        .write(&args.output_name, &toml)
        .with_context(|| format!("Failed to write output {}", args.output_name))?;

    if let ActionOutput::File(path) = &target {
        output::success(&format!("Wrote {} to {}", args.output_name, path));
    }
    Ok(())
}

/// Split a comma-separated mirror list, dropping blanks
fn split_mirrors(mirrors: &str) -> Vec<String> {
    mirrors
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}
