//! # cnb-actions-core
//!
//! Core library for the cnb-actions CLI providing:
//! - Configuration file parsing (cnb-actions.yaml)
//! - Error types shared by the CLI
//! - GitHub Actions step output encoding

pub mod config;
pub mod error;
pub mod output;

pub use config::{
    ActionsConfig, HttpConfig, LifecycleConfig, RegistryCredentials, TagScanMode,
    DEFAULT_LIFECYCLE_IMAGE,
};
pub use error::{Error, Result};
pub use output::ActionOutput;
