use std::io::Cursor;

use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use tracing::{debug, instrument};

use crate::crop::crop_surface;
use crate::dimensions::check_pixel_budget;
use crate::encode::encode_surface;
use crate::resize::resize_surface;
use crate::rotate::rotate_surface;
use crate::source::fetch_raw;
use crate::{ImageBlob, ImageError, ImageResult, ImageSource, TransformConfig, Transformations};

/// Runs a [`Transformations`] spec against an [`ImageSource`].
///
/// The engine holds the current working surface. Each step replaces it with a
/// freshly allocated one, and every call to [`process`](Self::process) starts
/// from a new decode, so a single instance can be reused sequentially.
pub struct TransformEngine {
    config: TransformConfig,
    http: reqwest::Client,
    surface: Option<RgbaImage>,
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformEngine {
    pub fn new() -> Self {
        Self::with_config(TransformConfig::default())
    }

    pub fn with_config(config: TransformConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            surface: None,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Dimensions of the surface left by the last successful transform
    pub fn surface_dimensions(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| s.dimensions())
    }

    /// Produce the blob to upload.
    ///
    /// With no spec (or an empty one) the source bytes are returned verbatim
    /// and nothing is decoded.
    #[instrument(skip_all, fields(source = %source.name_hint()))]
    pub async fn process(
        &mut self,
        source: &ImageSource,
        spec: Option<&Transformations>,
    ) -> ImageResult<ImageBlob> {
        let spec = match spec {
            Some(spec) if !spec.is_empty() => spec,
            _ => {
                debug!("No transformations requested, passing source through");
                self.surface = None;
                return fetch_raw(&self.http, source).await;
            }
        };

        spec.validate()?;

        let raw = fetch_raw(&self.http, source).await?;
        self.surface = Some(self.decode(&raw.bytes)?);

        if let Some(resize) = &spec.resize {
            let next = resize_surface(self.current()?, resize, self.config.filter, self.config.max_pixels)?;
            debug!("Resized to {}x{}", next.width(), next.height());
            self.surface = Some(next);
        }

        if let Some(crop) = &spec.crop {
            let next = crop_surface(self.current()?, crop)?;
            debug!("Cropped to {}x{}", next.width(), next.height());
            self.surface = Some(next);
        }

        if let Some(degrees) = spec.rotate {
            let next = rotate_surface(self.current()?, degrees, self.config.max_pixels)?;
            debug!("Rotated {} degrees to {}x{}", degrees, next.width(), next.height());
            self.surface = Some(next);
        }

        let format = spec.format.unwrap_or(self.config.default_format);
        let quality = spec.quality.unwrap_or(self.config.default_quality);
        let surface = self.current()?;
        let (width, height) = surface.dimensions();
        let bytes = encode_surface(surface, format, quality)?;

        debug!("Encoded {}x{} {} ({} bytes)", width, height, format, bytes.len());

        Ok(ImageBlob::new(bytes, format.content_type()).with_dimensions(width, height))
    }

    fn current(&self) -> ImageResult<&RgbaImage> {
        self.surface
            .as_ref()
            .ok_or_else(|| ImageError::transform("No image loaded"))
    }

    /// Decode to RGBA, upright as a browser would draw it (EXIF orientation applied)
    fn decode(&self, bytes: &[u8]) -> ImageResult<RgbaImage> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::decode(format!("Failed to read image: {e}")))?
            .into_decoder()
            .map_err(|e| ImageError::decode(format!("Failed to load image: {e}")))?;

        let (width, height) = decoder.dimensions();
        check_pixel_budget(width, height, self.config.max_pixels)?;

        let orientation = decoder
            .orientation()
            .map_err(|e| ImageError::decode(format!("Failed to read orientation: {e}")))?;
        let mut image = DynamicImage::from_decoder(decoder)
            .map_err(|e| ImageError::decode(format!("Failed to load image: {e}")))?;
        image.apply_orientation(orientation);

        debug!("Decoded {}x{} source ({:?})", width, height, orientation);
        Ok(image.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Crop, OutputFormat, Resize};
    use image::Rgba;

    fn png_source(width: u32, height: u32) -> ImageSource {
        let surface = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let bytes = encode_surface(&surface, OutputFormat::Png, 1.0).unwrap();
        ImageSource::binary("photo.png", "image/png", bytes)
    }

    #[tokio::test]
    async fn test_empty_spec_passes_through() {
        let source = png_source(8, 8);
        let mut engine = TransformEngine::new();

        let blob = engine.process(&source, Some(&Transformations::new())).await.unwrap();
        match &source {
            ImageSource::Binary { bytes, .. } => assert_eq!(&blob.bytes, bytes),
            ImageSource::Remote { .. } => unreachable!(),
        }
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.width, None);
        assert_eq!(engine.surface_dimensions(), None);
    }

    #[tokio::test]
    async fn test_defaults_to_jpeg() {
        let mut engine = TransformEngine::new();
        let spec = Transformations::new().with_rotate(0.0);

        let blob = engine.process(&png_source(8, 6), Some(&spec)).await.unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
        assert_eq!((blob.width, blob.height), (Some(8), Some(6)));
    }

    #[tokio::test]
    async fn test_steps_run_in_fixed_order() {
        let mut engine = TransformEngine::new();
        // Crop applies to the resized surface, rotate to the cropped one
        let spec = Transformations::new()
            .with_rotate(90.0)
            .with_crop(Crop::new(0, 0, 50, 20))
            .with_resize(Resize::exact(100, 100))
            .with_format(OutputFormat::Png);

        let blob = engine.process(&png_source(200, 200), Some(&spec)).await.unwrap();
        assert_eq!((blob.width, blob.height), (Some(20), Some(50)));
        assert_eq!(engine.surface_dimensions(), Some((20, 50)));
    }

    #[tokio::test]
    async fn test_invalid_quality_fails_before_decode() {
        let mut engine = TransformEngine::new();
        let source = ImageSource::binary("bad.png", "image/png", vec![0u8; 4]);
        let spec = Transformations::new().with_quality(1.5);

        let err = engine.process(&source, Some(&spec)).await.unwrap_err();
        assert!(err.is_transform());
    }

    #[tokio::test]
    async fn test_corrupt_bytes_are_decode_errors() {
        let mut engine = TransformEngine::new();
        let source = ImageSource::binary("bad.png", "image/png", vec![0u8; 64]);
        let spec = Transformations::new().with_format(OutputFormat::Png);

        let err = engine.process(&source, Some(&spec)).await.unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_decode_respects_pixel_budget() {
        let mut engine = TransformEngine::with_config(TransformConfig::new().with_max_pixels(100));
        let spec = Transformations::new().with_format(OutputFormat::Png);

        let err = engine.process(&png_source(20, 20), Some(&spec)).await.unwrap_err();
        assert!(err.is_transform());
    }

    /// JPEG whose EXIF block says "rotate 90 degrees clockwise to display"
    fn jpeg_rotated_by_exif(width: u32, height: u32) -> Vec<u8> {
        let surface = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let jpeg = encode_surface(&surface, OutputFormat::Jpeg, 0.9).unwrap();

        let tiff: [u8; 26] = [
            b'M', b'M', 0, 42, 0, 0, 0, 8, // header, IFD at 8
            0, 1, // one entry
            0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, 6, 0, 0, // Orientation = 6
            0, 0, 0, 0, // no next IFD
        ];
        let mut app1 = vec![0xFF, 0xE1, 0, (2 + 6 + tiff.len()) as u8];
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(&tiff);

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&app1);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[tokio::test]
    async fn test_exif_orientation_is_applied() {
        let source = ImageSource::binary("phone.jpg", "image/jpeg", jpeg_rotated_by_exif(16, 8));
        let spec = Transformations::new().with_format(OutputFormat::Png);

        let mut engine = TransformEngine::new();
        let blob = engine.process(&source, Some(&spec)).await.unwrap();
        assert_eq!((blob.width, blob.height), (Some(8), Some(16)));
    }
}
