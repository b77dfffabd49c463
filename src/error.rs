//! Errors raised while writing export artifacts.
//!
//! Musical input never fails an export; these cover the codecs and the
//! filesystem around them.

use thiserror::Error;

/// Errors that can occur while serializing or saving an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A project snapshot could not be parsed.
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The WAV encoder rejected the output.
    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    /// The buffer layout cannot be stored in a WAV file.
    #[error("unsupported channel layout: {channels} channels")]
    UnsupportedLayout {
        /// Requested channel count.
        channels: usize,
    },

    /// Building the stem archive failed.
    #[cfg(feature = "zip")]
    #[error("zip archive failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}
