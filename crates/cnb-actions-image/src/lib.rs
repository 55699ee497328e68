//! Container image version resolution for cnb-actions
//!
//! This crate provides functionality for:
//! - Parsing image references (`registry[:port]/path[:tag]`)
//! - Listing repository tags from OCI-compatible registries
//! - Selecting the latest semantic version, optionally pinned to a tag suffix
//!
//! # Example
//!
//! ```no_run
//! use cnb_actions_image::{ImageReference, RegistryClient, RegistrySettings, VersionResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegistryClient::new(RegistrySettings::default())?;
//!     let resolver = VersionResolver::new(client);
//!
//!     // build images are tagged <semver>-<stack tag>, e.g. 0.0.94-full-cnb
//!     let build_image = ImageReference::parse_untagged("index.docker.io/paketobuildpacks/build")?;
//!     let version = resolver.latest_version(&build_image, "-full-cnb").await?;
//!
//!     println!("Resolved to: {}", version);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod reference;
pub mod registry;
pub mod resolver;

pub use error::{ImageError, Result};
pub use reference::{ImageReference, DEFAULT_TAG};
pub use registry::{RegistryClient, RegistrySettings, TagLister};
pub use resolver::{select_latest, VersionResolver};

pub use cnb_actions_core::TagScanMode;
