use thiserror::Error;

/// Result type for image operations
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur while loading or transforming an image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The source could not be read or decoded (corrupt bytes, unreachable reference)
    #[error("Decode failed: {message}")]
    Decode { message: String },

    /// A transformation was given parameters it cannot honor
    #[error("Transform failed: {message}")]
    Transform { message: String },
}

impl ImageError {
    /// Create a decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a transform error
    pub fn transform<S: Into<String>>(message: S) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Get the error message without the stage prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Decode { message } | Self::Transform { message } => message,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    pub fn is_transform(&self) -> bool {
        matches!(self, Self::Transform { .. })
    }
}
