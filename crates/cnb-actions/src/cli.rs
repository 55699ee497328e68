//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// cnb-actions - keep Cloud Native Buildpacks builders on their latest versions
#[derive(Parser, Debug)]
#[command(name = "cnb-actions")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that talks to a registry
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to cnb-actions.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Skip tags without an X.Y.Z version instead of stopping at the first one
    #[arg(long, global = true)]
    pub skip_non_version_tags: bool,

    /// Bearer token for the command's registry
    #[arg(long, env = "REGISTRY_TOKEN", global = true, hide_env_values = true)]
    pub registry_token: Option<String>,

    /// Username for the command's registry
    #[arg(long, global = true, requires = "registry_password")]
    pub registry_username: Option<String>,

    /// Password for the command's registry
    #[arg(long, global = true, requires = "registry_username")]
    pub registry_password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the version and the effective resolution settings
    Version(VersionArgs),

    /// Image version queries
    #[command(subcommand)]
    Image(ImageCommands),

    /// builder.toml generation and updates
    #[command(subcommand)]
    Builder(BuilderCommands),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Image commands
#[derive(Subcommand, Debug)]
pub enum ImageCommands {
    /// Print the latest semantic version tag of an image repository
    LatestVersion(LatestVersionArgs),
}

#[derive(Args, Debug)]
pub struct LatestVersionArgs {
    /// Image reference (e.g. gcr.io/paketo-buildpacks/go)
    pub reference: String,

    /// Only consider tags ending in this suffix
    #[arg(long, default_value = "")]
    pub tag_suffix: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Builder commands
#[derive(Subcommand, Debug)]
pub enum BuilderCommands {
    /// Generate builder.toml from stack inputs and an order.toml
    Generate(BuilderGenerateArgs),

    /// Refresh versions in an existing builder.toml
    Update(BuilderUpdateArgs),
}

/// Where the resulting document is published
#[derive(Args, Debug)]
pub struct StepOutputArgs {
    /// Name of the step output
    #[arg(long, default_value = "builder_toml")]
    pub output_name: String,

    /// File to append step outputs to; `::set-output` is printed when unset
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct BuilderGenerateArgs {
    /// Stack ID
    #[arg(long)]
    pub stack: String,

    /// Build image without a tag
    #[arg(long)]
    pub build_image: String,

    /// Run image without a tag
    #[arg(long)]
    pub run_image: String,

    /// Comma-separated run image mirrors without tags (may be empty)
    #[arg(long)]
    pub run_image_mirrors: String,

    /// Tag shared by the stack images
    #[arg(long)]
    pub stack_image_tag: String,

    /// Path to order.toml
    #[arg(long)]
    pub order_file: Utf8PathBuf,

    /// Registry hosting the buildpacks named in the order
    #[arg(long)]
    pub registry_server: String,

    #[command(flatten)]
    pub output: StepOutputArgs,
}

#[derive(Args, Debug)]
pub struct BuilderUpdateArgs {
    /// Path to builder.toml
    #[arg(long)]
    pub builder_file: Utf8PathBuf,

    /// Registry hosting the buildpacks named in the order
    #[arg(long)]
    pub registry_server: String,

    #[command(flatten)]
    pub output: StepOutputArgs,
}
