use async_trait::async_trait;
use dog_image::ImageBlob;
use serde::{Deserialize, Serialize};

use crate::{ProgressReporter, UploadError, UploadResult};

/// Storage backends an upload can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// S3-compatible object storage
    S3,
    /// Cloudinary media CDN
    Cloudinary,
    /// Firebase (Google Cloud) Storage
    Firebase,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::S3, Backend::Cloudinary, Backend::Firebase];

    /// Tag used in configuration (`s3`, `cloudinary`, `firebase`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Cloudinary => "cloudinary",
            Self::Firebase => "firebase",
        }
    }

    /// Parse an upload type tag
    pub fn parse(tag: &str) -> UploadResult<Self> {
        Self::ALL
            .into_iter()
            .find(|backend| backend.as_str().eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| UploadError::validation(format!("Unsupported upload type: {tag}")))
    }
}

impl std::str::FromStr for Backend {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::S3 => "S3",
            Self::Cloudinary => "Cloudinary",
            Self::Firebase => "Firebase",
        })
    }
}

/// Checked once at the orchestration boundary, before any work starts
pub trait Validate {
    fn validate(&self) -> UploadResult<()>;
}

/// What a backend reports back about a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub size: u64,
    pub format: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Backend-assigned identifier, when the backend has one
    pub backend_id: Option<String>,
}

impl StoredObject {
    pub fn new<U: Into<String>, F: Into<String>>(url: U, size: u64, format: F) -> Self {
        Self {
            url: url.into(),
            size,
            format: format.into(),
            width: None,
            height: None,
            backend_id: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set dimensions only when both are known
    pub fn with_optional_dimensions(self, width: Option<u32>, height: Option<u32>) -> Self {
        match (width, height) {
            (Some(width), Some(height)) => self.with_dimensions(width, height),
            _ => self,
        }
    }

    pub fn with_backend_id<S: Into<String>>(mut self, id: S) -> Self {
        self.backend_id = Some(id.into());
        self
    }
}

/// Stores one blob at one destination path on a storage backend.
///
/// Implementations set the object's content type from the blob, report
/// progress through `progress` (natively or synthesized) and never retry.
#[async_trait]
pub trait UploadAdapter: Send + Sync {
    /// Credentials and backend-specific options
    type Config: Validate + Send + Sync;

    fn backend(&self) -> Backend;

    async fn upload(
        &self,
        blob: &ImageBlob,
        path: &str,
        config: &Self::Config,
        progress: &ProgressReporter,
    ) -> UploadResult<StoredObject>;
}
