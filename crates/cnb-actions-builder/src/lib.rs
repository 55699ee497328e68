//! builder.toml generation and update for Cloud Native Buildpacks builders
//!
//! This crate provides functionality for:
//! - Decoding and encoding builder.toml and order.toml documents
//! - Generating a builder.toml from stack inputs and an order.toml
//! - Refreshing the build image, lifecycle and buildpack versions of an
//!   existing builder.toml
//!
//! Every version is resolved through a [`VersionResolver`], so the same
//! tag-selection rules apply to build images, buildpacks and the lifecycle.
//!
//! [`VersionResolver`]: cnb_actions_image::VersionResolver

pub mod error;
pub mod model;
pub mod update;

pub use error::{BuilderError, Result};
pub use model::{BuilderFile, Buildpack, ImageConfig, Lifecycle, Order, OrderFile, Stack};
pub use update::{latest_build_image, validate_run_image_mirrors, BuilderUpdater, GenerateInputs};
