use thiserror::Error;

use retro_ipa_dat::DatError;
use retro_ipa_image::TranscodeError;

/// Errors that can occur while preparing or running a conversion batch.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The catalog could not be read or parsed
    #[error("Catalog error: {0}")]
    Catalog(#[from] DatError),

    /// A path that must be an existing directory is not one
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// The input folder could not be listed
    #[error("Scan error: {0}")]
    Scan(String),

    /// Decoding, resizing or writing one image failed
    #[error("{0}")]
    Transcode(#[from] TranscodeError),

    /// A worker task panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),
}

impl ConvertError {
    pub fn not_a_directory(msg: impl Into<String>) -> Self {
        Self::NotADirectory(msg.into())
    }

    pub fn scan(msg: impl Into<String>) -> Self {
        Self::Scan(msg.into())
    }

    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}
