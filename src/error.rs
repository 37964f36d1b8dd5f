use std::path::PathBuf;

use thiserror::Error;

/// Library error type for picture loading.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured picture library is missing or not a directory.
    #[error("invalid picture directory: {0}")]
    BadDir(String),

    /// The scan completed but found no images.
    #[error("no pictures found under {0}")]
    EmptyLibrary(PathBuf),

    /// A file was found but could not be decoded.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
