use thiserror::Error;

use retro_ipa_lib::ConvertError;

/// Errors that end the program with a non-zero exit code.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Catalog, folder or scan failure before any work started
    #[error("{0}")]
    Convert(#[from] ConvertError),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
