use image::imageops;
use image::RgbaImage;

use crate::{Crop, ImageError, ImageResult};

/// Extract `crop` from the surface. Rectangles reaching outside the surface are
/// rejected rather than clamped.
pub fn crop_surface(surface: &RgbaImage, crop: &Crop) -> ImageResult<RgbaImage> {
    let (width, height) = surface.dimensions();

    if crop.width == 0 || crop.height == 0 {
        return Err(ImageError::transform(format!(
            "Crop rectangle {}x{} is empty",
            crop.width, crop.height
        )));
    }

    let right = crop.x as u64 + crop.width as u64;
    let bottom = crop.y as u64 + crop.height as u64;
    if right > width as u64 || bottom > height as u64 {
        return Err(ImageError::transform(format!(
            "Crop rectangle {}x{} at ({}, {}) exceeds surface bounds {}x{}",
            crop.width, crop.height, crop.x, crop.y, width, height
        )));
    }

    if (crop.x, crop.y, crop.width, crop.height) == (0, 0, width, height) {
        return Ok(surface.clone());
    }

    Ok(imageops::crop_imm(surface, crop.x, crop.y, crop.width, crop.height).to_image())
}
