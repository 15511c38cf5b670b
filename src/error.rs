//! Error types for badge rendering and export.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for stamp operations.
pub type Result<T> = std::result::Result<T, BadgeError>;

/// Errors that can occur while building or exporting a stamp badge.
///
/// Malformed founding years are deliberately absent: they degrade to
/// [`AgeBand::Band1`](crate::AgeBand::Band1) instead of failing.
#[derive(Error, Debug)]
pub enum BadgeError {
    /// A badge field was rejected at entry.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An asset reference could not be found by the resolver.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// An asset reference points outside the asset root.
    #[error("asset path escapes the asset root: {0}")]
    UnsafeAssetPath(String),

    /// An artifact name is not a plain file name.
    #[error("artifact name is not a plain file name: {0}")]
    UnsafeArtifactName(String),

    /// The asset has an extension with no known MIME type.
    #[error("unsupported asset type: {0}")]
    UnsupportedAsset(String),

    /// Reading or writing a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The serialized document could not be loaded as an image source.
    #[error("failed to parse stamp document: {0}")]
    Parse(#[from] resvg::usvg::Error),

    /// The off-screen bitmap could not be allocated or drawn.
    #[error("rasterization failed: {0}")]
    Raster(String),

    /// Encoding the bitmap into a PNG failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// The sink does not support the requested capability.
    #[error("unsupported by this sink: {0}")]
    Unsupported(&'static str),

    /// A configuration or profile file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl BadgeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
