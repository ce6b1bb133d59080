use std::path::PathBuf;

use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Converter could not be started: {0}")]
    Launch(String),

    #[error("Converter exited with {status}: {stderr}")]
    Tool { status: String, stderr: String },

    #[error("Converter timed out after {0}s")]
    Timeout(u64),

    #[error("Converter produced no output at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Unreadable input document: {0}")]
    InvalidDocument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConvertError> for ApplicationError {
    fn from(error: ConvertError) -> Self {
        ApplicationError::ConversionFailed(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File too large (> {0} bytes)")]
    TooLarge(u64),

    #[error("Client stream failed: {0}")]
    Stream(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for ApplicationError {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::TooLarge(limit) => ApplicationError::PayloadTooLarge(limit),
            UploadError::Stream(msg) => {
                ApplicationError::BadRequest(format!("Invalid file data: {}", msg))
            }
            UploadError::Io(e) => ApplicationError::InternalError(format!("Upload failed: {}", e)),
        }
    }
}
