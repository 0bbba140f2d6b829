use dog_image::ImageError;
use thiserror::Error;

use crate::Backend;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur while preparing or performing an upload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The source could not be read or decoded
    #[error("Decode failed: {message}")]
    Decode { message: String },

    /// A transformation was given parameters it cannot honor
    #[error("Transform failed: {message}")]
    Transform { message: String },

    /// The storage backend rejected the upload or could not be reached
    #[error("{backend} upload failed: {message}")]
    Backend { backend: Backend, message: String },

    /// Options were rejected before any work started
    #[error("Invalid upload: {message}")]
    Validation { message: String },
}

impl UploadError {
    /// Create a backend error
    pub fn backend<S: Into<String>>(backend: Backend, message: S) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get the error message without the stage prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Decode { message }
            | Self::Transform { message }
            | Self::Backend { message, .. }
            | Self::Validation { message } => message,
        }
    }

    /// Name of the stage that failed, as used in log events
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Transform { .. } => "transform",
            Self::Backend { .. } => "upload",
            Self::Validation { .. } => "validate",
        }
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

impl From<ImageError> for UploadError {
    fn from(error: ImageError) -> Self {
        match error {
            ImageError::Decode { message } => Self::Decode { message },
            ImageError::Transform { message } => Self::Transform { message },
        }
    }
}
