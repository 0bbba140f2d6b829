use image::imageops::FilterType;

use crate::OutputFormat;

/// Quality used when a transformation does not specify one
pub const DEFAULT_QUALITY: f32 = 0.8;

/// Pixel budget for any surface the engine allocates (16384 x 16384)
pub const DEFAULT_MAX_PIXELS: u64 = 268_435_456;

/// Configuration for the transform engine
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Format used when a transformation does not name one
    pub default_format: OutputFormat,

    /// Quality used when a transformation does not name one, in `[0, 1]`
    pub default_quality: f32,

    /// Resampling filter for resize and cover/contain draws
    pub filter: FilterType,

    /// Upper bound on the pixel count of decoded and intermediate surfaces
    pub max_pixels: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Jpeg,
            default_quality: DEFAULT_QUALITY,
            filter: FilterType::CatmullRom,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl TransformConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback output format
    pub fn with_default_format(mut self, format: OutputFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Set the fallback quality
    pub fn with_default_quality(mut self, quality: f32) -> Self {
        self.default_quality = quality.clamp(0.0, 1.0);
        self
    }

    /// Set the resampling filter
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Set the pixel budget
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}
