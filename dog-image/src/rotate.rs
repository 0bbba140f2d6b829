use image::imageops;
use image::{Rgba, RgbaImage};

use crate::dimensions::{check_pixel_budget, quarter_turns, rotated_bounds};
use crate::{ImageError, ImageResult};

/// Rotate a surface clockwise about its center onto a freshly allocated canvas
/// sized to the rotated bounding box. Uncovered corners are transparent.
pub fn rotate_surface(surface: &RgbaImage, degrees: f64, max_pixels: u64) -> ImageResult<RgbaImage> {
    if !degrees.is_finite() {
        return Err(ImageError::transform("Rotation angle must be a finite number"));
    }

    if let Some(turns) = quarter_turns(degrees) {
        return Ok(match turns {
            0 => surface.clone(),
            1 => imageops::rotate90(surface),
            2 => imageops::rotate180(surface),
            _ => imageops::rotate270(surface),
        });
    }

    let (width, height) = surface.dimensions();
    let (new_w, new_h) = rotated_bounds(width, height, degrees);
    check_pixel_budget(new_w, new_h, max_pixels)?;

    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    let (src_cx, src_cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let (dst_cx, dst_cy) = (new_w as f64 / 2.0, new_h as f64 / 2.0);

    // Inverse mapping: each destination pixel center is rotated back into the source
    let canvas = RgbaImage::from_fn(new_w, new_h, |dx, dy| {
        let rx = dx as f64 + 0.5 - dst_cx;
        let ry = dy as f64 + 0.5 - dst_cy;
        let sx = rx * cos + ry * sin + src_cx - 0.5;
        let sy = -rx * sin + ry * cos + src_cy - 0.5;
        sample_bilinear(surface, sx, sy)
    });

    Ok(canvas)
}

/// Bilinear sample at a fractional position; taps outside the surface are transparent.
fn sample_bilinear(surface: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (width, height) = surface.dimensions();
    if x <= -1.0 || y <= -1.0 || x >= width as f64 || y >= height as f64 {
        return Rgba([0, 0, 0, 0]);
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let tap = |px: f64, py: f64| -> [f64; 4] {
        if px < 0.0 || py < 0.0 || px >= width as f64 || py >= height as f64 {
            return [0.0; 4];
        }
        let p = surface.get_pixel(px as u32, py as u32);
        // Premultiply so transparent taps don't bleed their color
        let a = p[3] as f64 / 255.0;
        [p[0] as f64 * a, p[1] as f64 * a, p[2] as f64 * a, p[3] as f64]
    };

    let taps = [
        (tap(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (tap(x0 + 1.0, y0), fx * (1.0 - fy)),
        (tap(x0, y0 + 1.0), (1.0 - fx) * fy),
        (tap(x0 + 1.0, y0 + 1.0), fx * fy),
    ];

    let mut acc = [0.0f64; 4];
    for (value, weight) in taps {
        for (channel, v) in acc.iter_mut().zip(value) {
            *channel += v * weight;
        }
    }

    let alpha = acc[3];
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremultiply = 255.0 / alpha;
    let channel = |v: f64| (v * unpremultiply).round().clamp(0.0, 255.0) as u8;

    Rgba([
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}
