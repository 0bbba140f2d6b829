//! Pure geometry for the pipeline: effective resize targets, fit placement,
//! and rotated bounding boxes. Nothing here touches pixels.

use crate::{FitMode, ImageError, ImageResult};

/// Where the scaled source lands on the target canvas, in canvas pixels.
/// `x`/`y` are negative when the draw overflows (cover).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    /// Rounded draw size, at least 1x1
    pub fn pixel_size(&self) -> (u32, u32) {
        (round_dimension(self.width), round_dimension(self.height))
    }

    /// Top-left corner for a draw of `pixel_size()` centered on a `target_w x target_h` canvas
    pub fn pixel_origin(&self, target_w: u32, target_h: u32) -> (i64, i64) {
        let (w, h) = self.pixel_size();
        (
            (target_w as i64 - w as i64).div_euclid(2),
            (target_h as i64 - h as i64).div_euclid(2),
        )
    }

    /// Whether the draw covers the whole canvas
    pub fn covers(&self, target_w: u32, target_h: u32) -> bool {
        let (w, h) = self.pixel_size();
        w >= target_w && h >= target_h
    }
}

fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Effective target for a resize.
///
/// With one dimension the other follows the source aspect ratio; with none the
/// natural size is kept.
pub fn target_dimensions(
    src_w: u32,
    src_h: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> (u32, u32) {
    let aspect = src_w as f64 / src_h as f64;
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, round_dimension(w as f64 / aspect)),
        (None, Some(h)) => (round_dimension(h as f64 * aspect), h),
        (None, None) => (src_w, src_h),
    }
}

/// Placement of a `src_w x src_h` image on a `target_w x target_h` canvas under `fit`.
pub fn fit_rect(src_w: u32, src_h: u32, target_w: u32, target_h: u32, fit: FitMode) -> DrawRect {
    let (sw, sh) = (src_w as f64, src_h as f64);
    let (tw, th) = (target_w as f64, target_h as f64);
    let scale_w = tw / sw;
    let scale_h = th / sh;

    let (width, height) = match fit {
        FitMode::Fill => (tw, th),
        FitMode::Cover | FitMode::Outside => {
            // The axis with the larger scale lands exactly on the target
            if scale_w >= scale_h {
                (tw, sh * scale_w)
            } else {
                (sw * scale_h, th)
            }
        }
        FitMode::Contain | FitMode::Inside => {
            if scale_w <= scale_h {
                (tw, sh * scale_w)
            } else {
                (sw * scale_h, th)
            }
        }
    };

    DrawRect {
        x: (tw - width) / 2.0,
        y: (th - height) / 2.0,
        width,
        height,
    }
}

/// Normalize an angle into `[0, 360)`
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Quarter turns for angles that are an exact multiple of 90 degrees
pub fn quarter_turns(degrees: f64) -> Option<u32> {
    let normalized = normalize_degrees(degrees);
    if normalized % 90.0 == 0.0 {
        Some((normalized / 90.0) as u32 % 4)
    } else {
        None
    }
}

/// Bounding box of a `width x height` surface rotated by `degrees`:
/// `|w cos| + |h sin|` by `|w sin| + |h cos|`, rounded to whole pixels.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    if let Some(turns) = quarter_turns(degrees) {
        return if turns % 2 == 0 {
            (width, height)
        } else {
            (height, width)
        };
    }

    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let (w, h) = (width as f64, height as f64);

    (
        round_dimension(w * cos + h * sin),
        round_dimension(w * sin + h * cos),
    )
}

/// Refuse allocations beyond the configured pixel budget
pub fn check_pixel_budget(width: u32, height: u32, max_pixels: u64) -> ImageResult<()> {
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(ImageError::transform(format!(
            "Image resolution {}x{} exceeds the limit of {} pixels",
            width, height, max_pixels
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(800, 600, Some(400), None), (400, 300));
        assert_eq!(target_dimensions(800, 600, None, Some(300)), (400, 300));
        assert_eq!(target_dimensions(800, 600, Some(100), Some(100)), (100, 100));
        assert_eq!(target_dimensions(800, 600, None, None), (800, 600));
        // Never collapses to zero
        assert_eq!(target_dimensions(1000, 1, Some(10), None), (10, 1));
    }

    #[test]
    fn test_cover_rect_overflows_and_centers() {
        // 2:1 source into a square: height constrains, width overflows
        let rect = fit_rect(200, 100, 100, 100, FitMode::Cover);
        assert_eq!(rect.height, 100.0);
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.x, -50.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.pixel_origin(100, 100), (-50, 0));
        assert!(rect.covers(100, 100));
    }

    #[test]
    fn test_contain_rect_letterboxes() {
        let rect = fit_rect(200, 100, 100, 100, FitMode::Contain);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 50.0);
        assert_eq!(rect.y, 25.0);
        assert_eq!(rect.pixel_origin(100, 100), (0, 25));
        assert!(!rect.covers(100, 100));
    }

    #[test]
    fn test_fill_and_aliases() {
        let fill = fit_rect(200, 100, 100, 100, FitMode::Fill);
        assert_eq!((fill.width, fill.height, fill.x, fill.y), (100.0, 100.0, 0.0, 0.0));

        assert_eq!(
            fit_rect(640, 480, 300, 300, FitMode::Inside),
            fit_rect(640, 480, 300, 300, FitMode::Contain)
        );
        assert_eq!(
            fit_rect(640, 480, 300, 300, FitMode::Outside),
            fit_rect(640, 480, 300, 300, FitMode::Cover)
        );
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(400, 300, 0.0), (400, 300));
        assert_eq!(rotated_bounds(400, 300, 90.0), (300, 400));
        assert_eq!(rotated_bounds(400, 300, -90.0), (300, 400));
        assert_eq!(rotated_bounds(400, 300, 180.0), (400, 300));
        assert_eq!(rotated_bounds(400, 300, 450.0), (300, 400));
        // 45 degrees: (400 + 300) * sqrt(2) / 2 on both axes
        assert_eq!(rotated_bounds(400, 300, 45.0), (495, 495));
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(quarter_turns(0.0), Some(0));
        assert_eq!(quarter_turns(270.0), Some(3));
        assert_eq!(quarter_turns(-90.0), Some(3));
        assert_eq!(quarter_turns(720.0), Some(0));
        assert_eq!(quarter_turns(30.0), None);
    }

    #[test]
    fn test_pixel_budget() {
        assert!(check_pixel_budget(100, 100, 10_000).is_ok());
        assert!(check_pixel_budget(101, 100, 10_000).unwrap_err().is_transform());
    }

    proptest! {
        #[test]
        fn contain_preserves_aspect_and_hits_constraining_axis(
            sw in 1u32..4000, sh in 1u32..4000, tw in 1u32..4000, th in 1u32..4000
        ) {
            let rect = fit_rect(sw, sh, tw, th, FitMode::Contain);
            let src_aspect = sw as f64 / sh as f64;
            let draw_aspect = rect.width / rect.height;
            prop_assert!((src_aspect - draw_aspect).abs() <= src_aspect * 1e-9);

            let width_constrains = (tw as f64 / sw as f64) <= (th as f64 / sh as f64);
            if width_constrains {
                prop_assert_eq!(rect.width, tw as f64);
                prop_assert!(rect.height <= th as f64 + 1e-9);
            } else {
                prop_assert_eq!(rect.height, th as f64);
                prop_assert!(rect.width <= tw as f64 + 1e-9);
            }
        }

        #[test]
        fn cover_always_covers_target(
            sw in 1u32..4000, sh in 1u32..4000, tw in 1u32..4000, th in 1u32..4000
        ) {
            let rect = fit_rect(sw, sh, tw, th, FitMode::Cover);
            prop_assert!(rect.width >= tw as f64 - 1e-9);
            prop_assert!(rect.height >= th as f64 - 1e-9);
        }

        #[test]
        fn quarter_rotation_round_trip_restores_dimensions(w in 1u32..5000, h in 1u32..5000) {
            let (rw, rh) = rotated_bounds(w, h, 90.0);
            prop_assert_eq!(rotated_bounds(rw, rh, 270.0), (w, h));
            prop_assert_eq!(rotated_bounds(rw, rh, -90.0), (w, h));
        }
    }
}
