//! builder.toml and order.toml documents

use crate::error::{BuilderError, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fs;

/// Buildpack entry inside an order group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildpack {
    pub id: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

/// `[[buildpacks]]` entry: a buildpack image and the version it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub image: String,

    #[serde(default)]
    pub version: String,
}

/// `[[order]]` entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub group: Vec<Buildpack>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Stack {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub build_image: String,

    #[serde(default)]
    pub run_image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run_image_mirrors: Vec<String>,
}

/// A builder.toml document.
///
/// Field order matches the layout `pack` expects in generated files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderFile {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub buildpacks: Vec<ImageConfig>,

    #[serde(default)]
    pub lifecycle: Lifecycle,

    #[serde(default)]
    pub order: Vec<Order>,

    #[serde(default)]
    pub stack: Stack,
}

/// An order.toml document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub order: Vec<Order>,
}

impl BuilderFile {
    /// Read and decode a builder.toml file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        Self::from_toml_str(&read_file(path, "builder.toml")?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| BuilderError::Parse {
            kind: "builder toml",
            source,
        })
    }

    /// Encode as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

impl OrderFile {
    /// Read and decode an order.toml file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        Self::from_toml_str(&read_file(path, "order.toml")?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| BuilderError::Parse {
            kind: "order toml",
            source,
        })
    }
}

fn read_file(path: &Utf8Path, kind: &'static str) -> Result<String> {
    fs::read_to_string(path).map_err(|source| BuilderError::Read {
        kind,
        path: path.to_string(),
        source,
    })
}
