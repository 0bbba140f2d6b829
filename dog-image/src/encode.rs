use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{Frame, Rgb, RgbImage, RgbaImage};

use crate::{ImageError, ImageResult, OutputFormat};

/// Map a `[0, 1]` quality onto the JPEG encoder's 1..=100 scale
pub fn jpeg_quality(quality: f32) -> u8 {
    ((quality.clamp(0.0, 1.0) * 100.0).round() as u8).clamp(1, 100)
}

/// Composite a surface over opaque black, as JPEG has no alpha channel
pub fn flatten_on_black(surface: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let [r, g, b, a] = surface.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Serialize a surface to `format`.
///
/// `quality` only affects JPEG; PNG and GIF are lossless and the WebP encoder
/// available here only writes lossless output.
pub fn encode_surface(surface: &RgbaImage, format: OutputFormat, quality: f32) -> ImageResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
            flatten_on_black(surface)
                .write_with_encoder(encoder)
                .map_err(|e| ImageError::transform(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            surface
                .write_with_encoder(encoder)
                .map_err(|e| ImageError::transform(format!("PNG encode failed: {e}")))?;
        }
        OutputFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut buf);
            surface
                .write_with_encoder(encoder)
                .map_err(|e| ImageError::transform(format!("WebP encode failed: {e}")))?;
        }
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut buf);
            encoder
                .encode_frame(Frame::new(surface.clone()))
                .map_err(|e| ImageError::transform(format!("GIF encode failed: {e}")))?;
        }
    }

    Ok(buf.into_inner())
}
