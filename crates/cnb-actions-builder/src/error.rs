//! Error types for cnb-actions-builder

use cnb_actions_image::ImageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuilderError>;

#[derive(Error, Debug)]
pub enum BuilderError {
    /// A TOML input file could not be read
    #[error("invalid path to {kind} ({path}): {source}")]
    Read {
        kind: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A TOML input file could not be decoded
    #[error("invalid {kind}: {source}")]
    Parse {
        kind: &'static str,
        #[source]
        source: toml::de::Error,
    },

    /// The generated document could not be encoded
    #[error("unable to create builder toml: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An image input failed to parse
    #[error("invalid {role} {reference}: {source}")]
    InvalidImage {
        role: &'static str,
        reference: String,
        #[source]
        source: ImageError,
    },

    /// Version resolution failed
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl BuilderError {
    pub(crate) fn invalid_image(role: &'static str, reference: &str, source: ImageError) -> Self {
        Self::InvalidImage {
            role,
            reference: reference.to_string(),
            source,
        }
    }
}
