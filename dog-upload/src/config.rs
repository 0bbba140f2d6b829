use std::time::Duration;

use dog_image::TransformConfig;

/// Configuration shared by every upload
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Settings for the transform engine created per upload
    pub transform: TransformConfig,

    /// Tick period for synthesized progress
    pub progress_interval: Duration,

    /// Blobs at or above this size use S3 multipart upload
    pub multipart_threshold: u64,

    /// Part size for S3 multipart upload (S3 minimum is 5MB)
    pub part_size: u64,

    /// Chunk size when streaming request bodies with real progress
    pub chunk_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            transform: TransformConfig::default(),
            progress_interval: Duration::from_millis(100),
            multipart_threshold: 8 * 1024 * 1024, // 8MB
            part_size: 8 * 1024 * 1024,           // 8MB
            chunk_size: 64 * 1024,                // 64KB
        }
    }
}

impl UploadConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set transform engine settings
    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    /// Set the synthesized progress tick period
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set multipart threshold
    pub fn with_multipart_threshold(mut self, bytes: u64) -> Self {
        self.multipart_threshold = bytes;
        self
    }

    /// Set multipart part size
    pub fn with_part_size(mut self, bytes: u64) -> Self {
        self.part_size = bytes;
        self
    }

    /// Set streaming chunk size
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }
}
