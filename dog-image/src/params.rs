use serde::{Deserialize, Serialize};

use crate::{ImageError, ImageResult};

/// Raster formats the pipeline can encode to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl OutputFormat {
    /// MIME type written as the object's content type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Short format name, as reported in upload receipts
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Whether `quality` has any effect on the encoded output
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Ok(Self::Jpeg),
            "png" | "image/png" => Ok(Self::Png),
            "webp" | "image/webp" => Ok(Self::WebP),
            "gif" | "image/gif" => Ok(Self::Gif),
            other => Err(ImageError::transform(format!("Unsupported output format: {other}"))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an image is scaled into target dimensions whose aspect ratio differs
/// from its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the target, clipping overflow
    #[default]
    Cover,
    /// Fit inside the target, letterboxing the rest
    Contain,
    /// Stretch to the target, ignoring aspect ratio
    Fill,
    /// Treated as `Contain`
    Inside,
    /// Treated as `Cover`
    Outside,
}

/// Resize step. Missing dimensions are derived from the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub fit: FitMode,
}

impl Resize {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width,
            height,
            fit: FitMode::default(),
        }
    }

    pub fn width(width: u32) -> Self {
        Self::new(Some(width), None)
    }

    pub fn height(height: u32) -> Self {
        Self::new(None, Some(height))
    }

    pub fn exact(width: u32, height: u32) -> Self {
        Self::new(Some(width), Some(height))
    }

    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }
}

/// Crop rectangle in surface pixels, applied after resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Crop {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The ordered set of operations applied to an image before upload.
///
/// Every field is optional. Regardless of which are present the order is
/// always resize, crop, rotate, encode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transformations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<Resize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    /// Degrees, clockwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    /// Encoder quality in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl Transformations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resize(mut self, resize: Resize) -> Self {
        self.resize = Some(resize);
        self
    }

    pub fn with_crop(mut self, crop: Crop) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_rotate(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// True when no operation is requested, i.e. the source passes through untouched
    pub fn is_empty(&self) -> bool {
        self.resize.is_none()
            && self.crop.is_none()
            && self.rotate.is_none()
            && self.quality.is_none()
            && self.format.is_none()
    }

    /// Reject parameters no surface could satisfy, before any decoding happens
    pub fn validate(&self) -> ImageResult<()> {
        if let Some(quality) = self.quality {
            if !(0.0..=1.0).contains(&quality) {
                return Err(ImageError::transform(format!(
                    "Quality must be within [0, 1], got {quality}"
                )));
            }
        }
        if let Some(resize) = &self.resize {
            if resize.width == Some(0) || resize.height == Some(0) {
                return Err(ImageError::transform("Resize dimensions must be greater than zero"));
            }
        }
        if let Some(crop) = &self.crop {
            if crop.width == 0 || crop.height == 0 {
                return Err(ImageError::transform(format!(
                    "Crop rectangle {}x{} is empty",
                    crop.width, crop.height
                )));
            }
        }
        if let Some(degrees) = self.rotate {
            if !degrees.is_finite() {
                return Err(ImageError::transform("Rotation angle must be a finite number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("jpeg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("JPG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("image/webp".parse::<OutputFormat>(), Ok(OutputFormat::WebP));
        assert_eq!("gif".parse::<OutputFormat>(), Ok(OutputFormat::Gif));
        assert!("tiff".parse::<OutputFormat>().unwrap_err().is_transform());
    }

    #[test]
    fn test_content_type_and_extension() {
        assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::WebP.content_type(), "image/webp");
        assert_eq!(OutputFormat::Png.as_str(), "png");
    }

    #[test]
    fn test_empty_transformations() {
        assert!(Transformations::new().is_empty());
        assert!(!Transformations::new().with_format(OutputFormat::Png).is_empty());
        assert!(!Transformations::new().with_quality(0.5).is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(Transformations::new().with_quality(1.5).validate().is_err());
        assert!(Transformations::new().with_quality(-0.1).validate().is_err());
        assert!(Transformations::new().with_resize(Resize::width(0)).validate().is_err());
        assert!(Transformations::new().with_crop(Crop::new(0, 0, 0, 10)).validate().is_err());
        assert!(Transformations::new().with_rotate(f64::NAN).validate().is_err());
        assert!(Transformations::new()
            .with_resize(Resize::exact(10, 10))
            .with_quality(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_deserialize_camel_json_shape() {
        let json = r#"{"resize":{"width":400,"fit":"contain"},"rotate":90,"quality":0.9,"format":"webp"}"#;
        let parsed: Transformations = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.resize, Some(Resize::width(400).with_fit(FitMode::Contain)));
        assert_eq!(parsed.rotate, Some(90.0));
        assert_eq!(parsed.quality, Some(0.9));
        assert_eq!(parsed.format, Some(OutputFormat::WebP));
        assert!(parsed.crop.is_none());
    }

    #[test]
    fn test_fit_defaults_to_cover() {
        let parsed: Resize = serde_json::from_str(r#"{"height":300}"#).unwrap();
        assert_eq!(parsed.fit, FitMode::Cover);
        assert_eq!(parsed.height, Some(300));
    }
}
