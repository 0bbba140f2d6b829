use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::dimensions::{check_pixel_budget, fit_rect, target_dimensions};
use crate::{FitMode, ImageResult, Resize};

/// Resize a surface onto a new canvas of exactly the effective target size.
///
/// Cover crops the visible window out of the source before scaling, so no
/// surface larger than the target is ever allocated. Contain draws the scaled
/// source centered and the letterboxing stays transparent.
pub fn resize_surface(
    surface: &RgbaImage,
    resize: &Resize,
    filter: FilterType,
    max_pixels: u64,
) -> ImageResult<RgbaImage> {
    let (src_w, src_h) = surface.dimensions();
    let (target_w, target_h) = target_dimensions(src_w, src_h, resize.width, resize.height);
    check_pixel_budget(target_w, target_h, max_pixels)?;

    if matches!(resize.fit, FitMode::Cover | FitMode::Outside) {
        return Ok(cover(surface, target_w, target_h, filter));
    }

    // Contain and fill draws never exceed the target
    let rect = fit_rect(src_w, src_h, target_w, target_h, resize.fit);
    let (draw_w, draw_h) = rect.pixel_size();
    let (draw_w, draw_h) = (draw_w.min(target_w), draw_h.min(target_h));

    let scaled = if (draw_w, draw_h) == (src_w, src_h) {
        surface.clone()
    } else {
        imageops::resize(surface, draw_w, draw_h, filter)
    };

    if (draw_w, draw_h) == (target_w, target_h) {
        return Ok(scaled);
    }

    let (x, y) = rect.pixel_origin(target_w, target_h);
    let mut canvas = RgbaImage::new(target_w, target_h);
    imageops::replace(&mut canvas, &scaled, x, y);

    Ok(canvas)
}

fn cover(surface: &RgbaImage, target_w: u32, target_h: u32, filter: FilterType) -> RgbaImage {
    let (src_w, src_h) = surface.dimensions();
    let window = visible_window(src_w, src_h, target_w, target_h);

    if (window.width, window.height) == (target_w, target_h) {
        return imageops::crop_imm(surface, window.x, window.y, window.width, window.height).to_image();
    }

    let view = imageops::crop_imm(surface, window.x, window.y, window.width, window.height);
    imageops::resize(&*view, target_w, target_h, filter)
}

/// Source rectangle that stays visible after a centered cover scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub(crate) fn visible_window(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> Window {
    let scale = (target_w as f64 / src_w as f64).max(target_h as f64 / src_h as f64);
    let width = ((target_w as f64 / scale).round() as u32).clamp(1, src_w);
    let height = ((target_h as f64 / scale).round() as u32).clamp(1, src_h);

    Window {
        x: (src_w - width) / 2,
        y: (src_h - height) / 2,
        width,
        height,
    }
}
